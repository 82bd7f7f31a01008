use actix_web::web;
use lazy_static::lazy_static;
use regex::Regex;
use shared::Role;
use std::str::FromStr;
use std::sync::Arc;

use super::jwt::{JwtError, JwtService};
use super::models::{AdminLoginRequest, AuthResponse, LoginRequest, RegisterRequest};
use super::password::{PasswordError, PasswordHasher, MIN_PASSWORD_LEN};
use crate::db::models::User;
use crate::db::{RepositoryError, UserRepository};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles");
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User already exists")]
    UserExists,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Please enter a strong password")]
    WeakPassword,
    #[error("Name is required")]
    MissingName,
    #[error("Invalid role")]
    UnknownRole,
    #[error("User doesn't exists")]
    UnknownUser,
    #[error("Invalid role for this user")]
    RoleMismatch,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Admin not found")]
    AdminNotFound,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Password hashing was interrupted")]
    Blocking,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    hasher: PasswordHasher,
    admin_app_url: Option<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt: JwtService,
        hasher: PasswordHasher,
        admin_app_url: Option<String>,
    ) -> Self {
        Self {
            users,
            jwt,
            hasher,
            admin_app_url,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AccountError> {
        let email = req.email.trim().to_string();

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AccountError::UserExists);
        }
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }
        if req.name.trim().is_empty() {
            return Err(AccountError::MissingName);
        }
        let role = match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Role::from_str(raw).map_err(|_| AccountError::UnknownRole)?,
            None => Role::default(),
        };

        let password_hash = self.hash_password(req.password).await?;
        let user = User::new(req.name.trim().to_string(), email, password_hash, role);

        self.users.create_user(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AccountError::UserExists,
            other => AccountError::Repository(other),
        })?;
        log::info!("Registered user {} with role {}", user.id, user.role);

        let token = self.jwt.generate_token(user.id, user.role)?;
        Ok(AuthResponse::new(token, user.role))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AccountError> {
        let user = self
            .users
            .find_user_by_email(req.email.trim())
            .await?
            .ok_or(AccountError::UnknownUser)?;

        if req.role.as_deref().map(str::trim) != Some(user.role.as_ref()) {
            log::warn!("Login for {} rejected: role mismatch", user.id);
            return Err(AccountError::RoleMismatch);
        }

        if !self.verify_password(req.password, user.password_hash.clone()).await? {
            return Err(AccountError::InvalidCredentials);
        }

        self.issue(&user)
    }

    pub async fn admin_login(&self, req: AdminLoginRequest) -> Result<AuthResponse, AccountError> {
        let user = self
            .users
            .find_user_by_email(req.email.trim())
            .await?
            .filter(|u| u.role == Role::Admin)
            .ok_or(AccountError::AdminNotFound)?;

        if !self.verify_password(req.password, user.password_hash.clone()).await? {
            return Err(AccountError::InvalidCredentials);
        }

        self.issue(&user)
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, AccountError> {
        let token = self.jwt.generate_token(user.id, user.role)?;
        let mut response = AuthResponse::new(token, user.role);
        if user.role == Role::Admin {
            response.redirect_url = self.admin_app_url.clone();
        }
        log::info!("User {} logged in as {}", user.id, user.role);
        Ok(response)
    }

    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = self.hasher;
        web::block(move || hasher.hash(&password))
            .await
            .map_err(|_| AccountError::Blocking)?
            .map_err(AccountError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AccountError> {
        let hasher = self.hasher;
        web::block(move || hasher.verify(&password, &hash))
            .await
            .map_err(|_| AccountError::Blocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("first.last+tag@shop.co.in"));
        assert!(!is_valid_email("ann@example"));
        assert!(!is_valid_email("ann.example.com"));
        assert!(!is_valid_email("ann @example.com"));
        assert!(!is_valid_email(""));
    }
}
