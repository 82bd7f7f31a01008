pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod order;
pub mod recommend;
pub mod routes;
pub mod services;
