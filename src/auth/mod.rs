pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

pub use password::{hash_password, verify_password, PasswordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub district_id: Option<i64>,
    pub is_superuser: bool,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        user_id: i64,
        username: String,
        district_id: Option<i64>,
        is_superuser: bool,
        token_type: TokenType,
    ) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let lifetime = match token_type {
            TokenType::Access => Duration::hours(security.jwt_expiry_hours as i64),
            TokenType::Refresh => Duration::days(security.refresh_expiry_days as i64),
        };

        Self {
            user_id,
            username,
            district_id,
            is_superuser,
            token_type,
            jti: Uuid::new_v4(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Same subject, different token type and fresh timestamps
    pub fn reissue(&self, token_type: TokenType) -> Self {
        Self::new(
            self.user_id,
            self.username.clone(),
            self.district_id,
            self.is_superuser,
            token_type,
        )
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("{0}")]
    Invalid(String),

    #[error("Expected {expected} token, got {found} token")]
    WrongTokenType { expected: &'static str, found: String },
}

/// Access and refresh token issued together on login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret.as_str())
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode and validate a token, rejecting it if it is not of the expected type
pub fn decode_jwt(token: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let validation = Validation::default();

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::Invalid(e.to_string()))?
        .claims;

    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
            found: claims.token_type.as_str().to_string(),
        });
    }

    Ok(claims)
}

pub fn issue_token_pair(
    user_id: i64,
    username: &str,
    district_id: Option<i64>,
    is_superuser: bool,
) -> Result<TokenPair, JwtError> {
    let access = Claims::new(user_id, username.to_string(), district_id, is_superuser, TokenType::Access);
    let refresh = access.reissue(TokenType::Refresh);

    Ok(TokenPair {
        access: generate_jwt(&access)?,
        refresh: generate_jwt(&refresh)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_round_trip() {
        let claims = Claims::new(7, "alice".into(), Some(3), false, TokenType::Access);
        let token = generate_jwt(&claims).unwrap();

        let decoded = decode_jwt(&token, TokenType::Access).unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.district_id, Some(3));
        assert!(!decoded.is_superuser);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let pair = issue_token_pair(1, "root", None, true).unwrap();

        assert!(matches!(
            decode_jwt(&pair.refresh, TokenType::Access),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(decode_jwt(&pair.refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert!(matches!(decode_jwt("not.a.token", TokenType::Access), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_refresh_outlives_access() {
        let access = Claims::new(1, "u".into(), None, false, TokenType::Access);
        let refresh = access.reissue(TokenType::Refresh);
        assert!(refresh.exp > access.exp);
        assert_ne!(refresh.jti, access.jti);
    }
}
