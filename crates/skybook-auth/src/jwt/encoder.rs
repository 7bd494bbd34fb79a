//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use skybook_core::config::MAX_TOKEN_TTL_SECONDS;
use skybook_core::config::auth::AuthConfig;
use skybook_core::error::{AppError, ErrorKind};

use super::claims::{Claims, TokenType};

/// Creates signed HS256 access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    issuer: String,
    access_ttl_seconds: u64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .finish()
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    /// The compact JWS.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub expires_in_seconds: u64,
    /// Token id.
    pub jti: Uuid,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl_seconds: config.access_token_ttl_seconds,
        }
    }

    /// Signs an access token for `username` issued at `now`.
    pub fn issue_access_token(
        &self,
        username: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<IssuedAccessToken, AppError> {
        let ttl = self.access_ttl_seconds.min(MAX_TOKEN_TTL_SECONDS);
        let expires_at = now + Duration::seconds(ttl as i64);

        let mut sorted = roles.to_vec();
        sorted.sort();

        let claims = Claims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            roles: sorted,
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to sign access token", e)
        })?;

        Ok(IssuedAccessToken {
            token,
            expires_at,
            expires_in_seconds: ttl,
            jti: claims.jti,
        })
    }
}
