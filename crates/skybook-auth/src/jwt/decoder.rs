//! JWT token validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use skybook_core::config::auth::AuthConfig;
use skybook_core::error::AppError;
use skybook_core::traits::Clock;

use super::claims::{Claims, TokenType};

/// Allowed clock skew when checking expiry.
const LEEWAY_SECONDS: i64 = 5;

/// Validates access tokens.
///
/// Expiry is checked against the injected [`Clock`] rather than the
/// library's wall-clock check.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Issuer
    /// 3. Expiration
    /// 4. Token type is Access
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::unauthenticated("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthenticated("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::unauthenticated("Invalid token issuer")
                }
                _ => AppError::unauthenticated(format!("Token validation failed: {e}")),
            })?
            .claims;

        if claims.exp + LEEWAY_SECONDS <= self.clock.now().timestamp() {
            return Err(AppError::unauthenticated("Token has expired"));
        }

        if claims.token_type != TokenType::Access {
            return Err(AppError::unauthenticated(
                "Invalid token type: expected access token",
            ));
        }

        Ok(claims)
    }
}
