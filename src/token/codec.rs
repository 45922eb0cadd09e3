/// Signing and verification of compact tokens.
///
/// A symmetric MAC (HS512) keyed by the shared secret covers the claims.
/// Verification recomputes the effective expiry itself: access tokens use
/// the embedded `exp`, refresh tokens use `iat` plus the configured refresh
/// lifetime. Library-side expiry checking is disabled so both paths go
/// through the same computation.
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use uuid::Uuid;

use crate::configuration::JwtSettings;
use crate::token::Claims;

/// Which lifetime policy was applied at issuance. The two kinds are the
/// same wire format; verification decides how to compute the expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a parseable compact token
    Malformed,
    /// Signature or issuer check failed
    Signature,
    /// Past the computed effective expiry
    Expired,
    /// Signing failed at issuance
    Creation(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "token is malformed"),
            TokenError::Signature => write!(f, "token signature verification failed"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::Creation(msg) => write!(f, "token creation failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Clone)]
pub struct TokenCodec {
    config: JwtSettings,
}

impl TokenCodec {
    pub fn new(config: JwtSettings) -> Self {
        Self { config }
    }

    fn lifetime_seconds(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.config.access_token_expiry,
            TokenKind::Refresh => self.config.refresh_token_expiry,
        }
    }

    /// Issue a signed token for a user. Pure computation: claims are built,
    /// signed, and serialized; nothing is persisted.
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, TokenError> {
        let claims = Claims::new(
            user_id,
            self.config.issuer.clone(),
            self.lifetime_seconds(kind),
        );

        encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Fails with `Signature` if the MAC or issuer does not check out and
    /// with `Expired` if the computed expiry is in the past. For refresh
    /// verification the embedded `exp` is ignored; only `iat` plus the
    /// configured refresh lifetime counts.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is recomputed below; the library must not pre-empt it
        validation.validate_exp = false;
        validation.set_issuer(&[&self.config.issuer]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!(error = %e, "Token verification error");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::Signature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let expiry = claims.effective_expiry(
            kind == TokenKind::Refresh,
            self.config.refresh_token_expiry,
        );
        if expiry <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// The instant a verified token stops being honored; revocation records
    /// keep the jti exactly this long.
    pub fn effective_expires_at(&self, claims: &Claims, kind: TokenKind) -> DateTime<Utc> {
        let ts = claims.effective_expiry(
            kind == TokenKind::Refresh,
            self.config.refresh_token_expiry,
        );
        Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn encode_raw(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS512),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode test token")
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let codec = TokenCodec::new(test_config());
        let user_id = Uuid::new_v4();

        let token = codec
            .issue(user_id, TokenKind::Access)
            .expect("Failed to issue token");
        let claims = codec
            .verify(&token, TokenKind::Access)
            .expect("Failed to verify token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_malformed_token() {
        let codec = TokenCodec::new(test_config());

        assert_eq!(
            codec.verify("not.a.token", TokenKind::Access),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            codec.verify("", TokenKind::Access),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_tampered_token() {
        let codec = TokenCodec::new(test_config());
        let token = codec
            .issue(Uuid::new_v4(), TokenKind::Access)
            .expect("Failed to issue token");

        let tampered = format!("{}X", token);
        assert!(codec.verify(&tampered, TokenKind::Access).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let codec = TokenCodec::new(test_config());
        let claims = Claims::new(Uuid::new_v4(), "test".to_string(), 3600);
        let token = encode_raw(&claims, "a-completely-different-secret-entirely");

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::Signature)
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let codec = TokenCodec::new(test_config());
        let mut claims = Claims::new(Uuid::new_v4(), "test".to_string(), 3600);
        claims.iss = "someone-else".to_string();
        let token = encode_raw(&claims, &test_config().secret);

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::Signature)
        );
    }

    #[test]
    fn test_expired_access_token() {
        let codec = TokenCodec::new(test_config());
        let mut claims = Claims::new(Uuid::new_v4(), "test".to_string(), 3600);
        claims.iat -= 7200;
        claims.exp = claims.iat + 3600; // expired an hour ago
        let token = encode_raw(&claims, &test_config().secret);

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_refresh_verification_ignores_embedded_expiry() {
        let codec = TokenCodec::new(test_config());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "test".to_string(),
            iat: now - 100,
            exp: now - 50, // embedded expiry already past
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode_raw(&claims, &test_config().secret);

        // As an access token it is expired
        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
        // As a refresh token only iat + refresh lifetime counts, which is
        // still far in the future
        assert!(codec.verify(&token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_refresh_expires_from_issued_at() {
        let codec = TokenCodec::new(test_config());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "test".to_string(),
            iat: now - 604800 - 10, // refresh lifetime elapsed
            exp: now + 100000,      // embedded expiry far in the future
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode_raw(&claims, &test_config().secret);

        // The generous embedded expiry keeps it alive as an access token
        assert!(codec.verify(&token, TokenKind::Access).is_ok());
        // But as a refresh token it is dead
        assert_eq!(
            codec.verify(&token, TokenKind::Refresh),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_effective_expires_at_for_refresh() {
        let codec = TokenCodec::new(test_config());
        let claims = Claims::new(Uuid::new_v4(), "test".to_string(), 3600);

        let access = codec.effective_expires_at(&claims, TokenKind::Access);
        let refresh = codec.effective_expires_at(&claims, TokenKind::Refresh);

        assert_eq!(access.timestamp(), claims.exp);
        assert_eq!(refresh.timestamp(), claims.iat + 604800);
    }
}
