use std::collections::BTreeSet;

use axum::http::HeaderValue;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::JwtError;
use crate::config::SecurityConfig;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified caller identity, built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
    roles: BTreeSet<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }
}

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Identified(Identity),
}

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Caller::Anonymous => None,
            Caller::Identified(identity) => Some(identity),
        }
    }
}

/// Why a presented credential was rejected. Only ever logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    #[serde(default)]
    realm_access: Option<Value>,
}

/// Verifies HS256 bearer tokens against the key configured at startup.
pub struct TokenAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    pub fn new(security: &SecurityConfig) -> Result<Self, JwtError> {
        if security.jwt_secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        match &security.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &security.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(security.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Turns an optional `Authorization` header value into a caller.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Caller, AuthError> {
        let Some(header) = header else {
            return Ok(Caller::Anonymous);
        };

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::UnsupportedScheme)?;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = token_data.claims;

        let subject = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("missing subject".to_string()))?;
        let roles = extract_roles(claims.realm_access.as_ref())?;

        Ok(Caller::Identified(Identity { subject, roles }))
    }

    /// Boundary policy: every authentication failure becomes an anonymous
    /// caller. The reason is logged, never returned.
    pub fn resolve(&self, header: Option<&HeaderValue>) -> Caller {
        let header = match header.map(HeaderValue::to_str) {
            None => None,
            Some(Ok(value)) => Some(value),
            Some(Err(_)) => {
                tracing::warn!("Authentication failed: {}", AuthError::UnsupportedScheme);
                return Caller::Anonymous;
            }
        };

        match self.authenticate(header) {
            Ok(caller) => {
                if let Caller::Identified(identity) = &caller {
                    tracing::debug!(
                        "Authenticated '{}' with roles {:?}",
                        identity.subject(),
                        identity.roles()
                    );
                }
                caller
            }
            Err(e) => {
                tracing::warn!("Authentication failed: {}", e);
                Caller::Anonymous
            }
        }
    }
}

/// Reads `realm_access.roles`. Absent claims mean no roles; anything other
/// than a list of strings is malformed.
fn extract_roles(realm_access: Option<&Value>) -> Result<BTreeSet<String>, AuthError> {
    let Some(realm_access) = realm_access else {
        return Ok(BTreeSet::new());
    };
    let realm_access = realm_access
        .as_object()
        .ok_or_else(|| AuthError::InvalidToken("malformed realm_access claim".to_string()))?;
    let Some(roles) = realm_access.get("roles") else {
        return Ok(BTreeSet::new());
    };

    let malformed = || AuthError::InvalidToken("malformed roles claim".to_string());
    roles
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|role| role.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn security() -> SecurityConfig {
        SecurityConfig {
            enable_cors: false,
            cors_origins: vec![],
            jwt_secret: SECRET.to_string(),
            jwt_issuer: None,
            jwt_audience: None,
            jwt_expiry_hours: 1,
        }
    }

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(&security()).unwrap()
    }

    fn sign(mut claims: Value, secret: &str) -> String {
        if claims.get("exp").is_none() {
            claims["exp"] = json!(Utc::now().timestamp() + 3600);
        }
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn bearer(claims: Value) -> String {
        format!("Bearer {}", sign(claims, SECRET))
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(authenticator().authenticate(None), Ok(Caller::Anonymous));
        assert_eq!(authenticator().resolve(None), Caller::Anonymous);
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let result = authenticator().authenticate(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(result, Err(AuthError::UnsupportedScheme));
        let result = authenticator().authenticate(Some("bearer abc"));
        assert_eq!(result, Err(AuthError::UnsupportedScheme));
    }

    #[test]
    fn valid_token_yields_subject_and_roles() {
        let header = bearer(json!({"sub": "alice", "realm_access": {"roles": ["user", "admin"]}}));
        let caller = authenticator().authenticate(Some(&header)).unwrap();
        let identity = caller.identity().unwrap();
        assert_eq!(identity.subject(), "alice");
        assert!(identity.has_role("admin"));
        assert!(identity.has_role("user"));
        assert_eq!(identity.roles().len(), 2);
    }

    #[test]
    fn absent_realm_access_means_no_roles() {
        let header = bearer(json!({"sub": "bob"}));
        let caller = authenticator().authenticate(Some(&header)).unwrap();
        assert!(caller.identity().unwrap().roles().is_empty());

        let header = bearer(json!({"sub": "bob", "realm_access": {}}));
        let caller = authenticator().authenticate(Some(&header)).unwrap();
        assert!(caller.identity().unwrap().roles().is_empty());
    }

    #[test]
    fn wrong_signature_is_invalid() {
        let header = format!("Bearer {}", sign(json!({"sub": "mallory"}), "another-secret"));
        assert!(matches!(
            authenticator().authenticate(Some(&header)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let header = bearer(json!({"sub": "carol", "exp": Utc::now().timestamp() - 3600}));
        assert!(matches!(
            authenticator().authenticate(Some(&header)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn missing_subject_is_invalid() {
        let header = bearer(json!({"realm_access": {"roles": ["admin"]}}));
        assert_eq!(
            authenticator().authenticate(Some(&header)),
            Err(AuthError::InvalidToken("missing subject".to_string()))
        );
    }

    #[test]
    fn malformed_roles_are_invalid_and_resolve_anonymous() {
        let authenticator = authenticator();
        for realm_access in [
            json!({"roles": ["user", 7]}),
            json!({"roles": "admin"}),
            json!({"roles": null}),
            json!(["admin"]),
        ] {
            let header = bearer(json!({"sub": "dave", "realm_access": realm_access}));
            assert!(matches!(
                authenticator.authenticate(Some(&header)),
                Err(AuthError::InvalidToken(_))
            ));
            let value = HeaderValue::from_str(&header).unwrap();
            assert_eq!(authenticator.resolve(Some(&value)), Caller::Anonymous);
        }
    }

    #[test]
    fn audience_is_enforced_when_configured() {
        let mut security = security();
        security.jwt_audience = Some("shop".to_string());
        let authenticator = TokenAuthenticator::new(&security).unwrap();

        let good = bearer(json!({"sub": "erin", "aud": "shop"}));
        assert!(authenticator.authenticate(Some(&good)).is_ok());
        let bad = bearer(json!({"sub": "erin", "aud": "elsewhere"}));
        assert!(authenticator.authenticate(Some(&bad)).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let mut security = security();
        security.jwt_secret.clear();
        assert!(TokenAuthenticator::new(&security).is_err());
    }
}
