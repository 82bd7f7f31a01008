pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;

pub use jwt::{JwtError, JwtService};
pub use middleware::AuthMiddleware;
pub use models::Session;
pub use password::PasswordHasher;
pub use service::{AccountError, AuthService};
