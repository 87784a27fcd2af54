use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub preferred_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no trusted public keys configured")]
    NoKeys,
    #[error("failed to parse RSA public key at index {index}: {reason}")]
    InvalidKey { index: usize, reason: String },
    #[error("token expired")]
    Expired,
    #[error("token verification failed with all public keys: {0}")]
    Rejected(String),
    #[error("missing preferred username in token")]
    MissingPreferredUsername,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::MissingPreferredUsername => {
                AppError::unauthorized("missing_preferred_username")
            }
            TokenError::Rejected(_) => AppError::unauthorized("invalid_token"),
            TokenError::NoKeys | TokenError::InvalidKey { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Verifies access tokens against an ordered set of trusted RSA keys.
///
/// Old and new keys coexist during a rollover; the first key that accepts
/// the token wins.
pub struct JwtValidator {
    keys: Vec<DecodingKey>,
    validation: Validation,
}

impl JwtValidator {
    pub fn new<S: AsRef<str>>(public_key_pems: &[S]) -> Result<Self, TokenError> {
        if public_key_pems.is_empty() {
            return Err(TokenError::NoKeys);
        }

        let keys = public_key_pems
            .iter()
            .enumerate()
            .map(|(index, pem)| {
                DecodingKey::from_rsa_pem(pem.as_ref().as_bytes()).map_err(|e| {
                    TokenError::InvalidKey {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
        // Audience is issuer specific and not part of what this service trusts.
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self { keys, validation })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Validates `token` (an optional `Bearer ` prefix is stripped) and
    /// returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();

        // Expiry is only checked once a key has accepted the signature, so a
        // single expired verdict outranks signature mismatches from other keys.
        let mut expired = false;
        let mut last_err = None;

        for (index, key) in self.keys.iter().enumerate() {
            match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => {
                    tracing::debug!(key_index = index, "token verified");
                    return Ok(data.claims);
                }
                Err(e) => {
                    if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                        expired = true;
                    }
                    last_err = Some(e);
                }
            }
        }

        if expired {
            return Err(TokenError::Expired);
        }
        Err(TokenError::Rejected(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    pub fn preferred_username(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.validate_token(token)?;
        if claims.preferred_username.is_empty() {
            return Err(TokenError::MissingPreferredUsername);
        }
        Ok(claims.preferred_username)
    }
}
