//! JWT authentication and role gates for staff endpoints.
//!
//! ## Two credential kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Staff / kitchen displays:  JWT bearer token                            │
//! │    Authorization: Bearer <jwt>   (normal clients)                       │
//! │    ?token=<jwt>                  (EventSource cannot set headers)       │
//! │                                                                         │
//! │  Guests:                    table token (see routes::orders::public)   │
//! │    opaque 32-hex string, no JWT involved                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tenant id for every staff operation comes from the validated claims,
//! never from the request body or path.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Roles
// =============================================================================

/// Staff roles, least to most restricted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Manager,
    Cashier,
    Kitchen,
}

// =============================================================================
// Claims & Manager
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff user id)
    pub sub: String,

    /// Tenant the token is scoped to
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,

    /// Staff role
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a staff token.
    pub fn generate_token(
        &self,
        user_id: &str,
        restaurant_id: &str,
        role: Role,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthenticated(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Extract a `token=` value from a raw query string.
fn token_from_query(query: &str) -> Option<&str> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractor
// =============================================================================

/// Authenticated staff context, extracted from the JWT on every staff route.
#[derive(Debug, Clone)]
pub struct StaffAuth {
    pub user_id: String,
    pub restaurant_id: String,
    pub role: Role,
}

impl StaffAuth {
    /// Gates a handler to the given roles.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "role {:?} may not perform this operation",
                self.role
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for StaffAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Header first; query-string fallback for EventSource clients.
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
            .or_else(|| parts.uri.query().and_then(token_from_query))
            .ok_or_else(|| ApiError::Unauthenticated("Missing credentials".to_string()))?;

        let claims = state.jwt.validate_token(token)?;

        Ok(StaffAuth {
            user_id: claims.sub,
            restaurant_id: claims.restaurant_id,
            role: claims.role,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token("u1", "r1", Role::Cashier).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.restaurant_id, "r1");
        assert_eq!(claims.role, Role::Cashier);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let other = JwtManager::new("different-secret".to_string(), 3600);

        let token = manager.generate_token("u1", "r1", Role::Owner).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Kitchen).unwrap(), "\"KITCHEN\"");
        let r: Role = serde_json::from_str("\"CASHIER\"").unwrap();
        assert_eq!(r, Role::Cashier);
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_query_token_extraction() {
        assert_eq!(token_from_query("token=abc"), Some("abc"));
        assert_eq!(token_from_query("a=1&token=abc&b=2"), Some("abc"));
        assert_eq!(token_from_query("a=1"), None);
        assert_eq!(token_from_query("token="), None);
    }

    #[test]
    fn test_role_gate() {
        let auth = StaffAuth {
            user_id: "u1".into(),
            restaurant_id: "r1".into(),
            role: Role::Kitchen,
        };

        assert!(auth.require(&[Role::Kitchen, Role::Manager]).is_ok());
        assert!(auth.require(&[Role::Owner, Role::Manager]).is_err());
    }
}
