use super::models::{Claims, Session};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use shared::Role;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("JWT decoding error: {0}")]
    Decoding(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn generate_token(&self, user_id: Uuid, role: Role) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + self.ttl;

        let claims = Claims {
            id: user_id.to_string(),
            role,
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(JwtError::Encoding)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() || token.split('.').count() != 3 {
            return Err(JwtError::InvalidToken);
        }

        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => {
                log::debug!(
                    "JWT token decoded. User: {}, Role: {}, Exp: {}",
                    token_data.claims.id,
                    token_data.claims.role,
                    token_data.claims.exp
                );
                Ok(token_data.claims)
            }
            Err(err) => {
                log::debug!("JWT token decode error: {:?}", err);
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::TokenExpired),
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(JwtError::InvalidToken),
                    _ => Err(JwtError::Decoding(err.to_string())),
                }
            }
        }
    }

    /// Verifies the token and resolves it into the session carried by the request.
    pub fn session_from_token(&self, token: &str) -> Result<Session, JwtError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.id).map_err(|_| JwtError::InvalidToken)?;
        Ok(Session {
            user_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_id_and_role() {
        let jwt = JwtService::new("secret", 24);
        let user_id = Uuid::new_v4();
        let token = jwt.generate_token(user_id, Role::Admin).unwrap();

        let session = jwt.session_from_token(&token).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.role, Role::Admin);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = JwtService::new("one", 24)
            .generate_token(Uuid::new_v4(), Role::Customer)
            .unwrap();
        let err = JwtService::new("two", 24).verify_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret", -2);
        let token = jwt.generate_token(Uuid::new_v4(), Role::Customer).unwrap();
        assert!(matches!(jwt.verify_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn malformed_token_is_rejected_before_decoding() {
        let jwt = JwtService::new("secret", 24);
        assert!(matches!(jwt.verify_token(""), Err(JwtError::InvalidToken)));
        assert!(matches!(jwt.verify_token("abc.def"), Err(JwtError::InvalidToken)));
    }
}
