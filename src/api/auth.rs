use std::collections::HashSet;
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::error::ApiError;

/// Operations a caller may be granted. Matches the role names the
/// upstream gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ConfigRead,
    ConfigWrite,
    TagRead,
    TagWrite,
    SurveyRead,
    SurveyWrite,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Role::ConfigRead => write!(f, "CONFIG_READ"),
            Role::ConfigWrite => write!(f, "CONFIG_WRITE"),
            Role::TagRead => write!(f, "TAG_READ"),
            Role::TagWrite => write!(f, "TAG_WRITE"),
            Role::SurveyRead => write!(f, "SURVEY_READ"),
            Role::SurveyWrite => write!(f, "SURVEY_WRITE"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "CONFIG_READ" => Ok(Role::ConfigRead),
            "CONFIG_WRITE" => Ok(Role::ConfigWrite),
            "TAG_READ" => Ok(Role::TagRead),
            "TAG_WRITE" => Ok(Role::TagWrite),
            "SURVEY_READ" => Ok(Role::SurveyRead),
            "SURVEY_WRITE" => Ok(Role::SurveyWrite),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Axum extractor for the caller's granted roles.
///
/// Authentication happens upstream; this service only reads the
/// `x-api-roles` header the gateway forwards (comma-separated role
/// names). A request without the header is treated as fully trusted,
/// which is the development default for direct local use.
#[derive(Debug, Clone)]
pub struct AuthContext {
    roles: Option<HashSet<Role>>,
}

impl AuthContext {
    /// Full access; used when no roles header is present
    pub fn unrestricted() -> Self {
        Self { roles: None }
    }

    pub fn with_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: Some(roles.into_iter().collect()),
        }
    }

    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        match &self.roles {
            None => Ok(()),
            Some(granted) if granted.contains(&role) => Ok(()),
            Some(_) => Err(ApiError::Forbidden(role)),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(roles_from_headers(&parts.headers))
    }
}

fn roles_from_headers(headers: &HeaderMap) -> AuthContext {
    let Some(value) = headers.get("x-api-roles").and_then(|v| v.to_str().ok()) else {
        return AuthContext::unrestricted();
    };

    let mut roles = HashSet::new();
    for name in value.split(',').filter(|s| !s.trim().is_empty()) {
        match name.parse::<Role>() {
            Ok(role) => {
                roles.insert(role);
            }
            Err(e) => log::warn!("ignoring unparsable role in x-api-roles: {}", e),
        }
    }
    AuthContext { roles: Some(roles) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_missing_header_is_unrestricted() {
        let ctx = roles_from_headers(&HeaderMap::new());
        assert!(ctx.require(Role::ConfigWrite).is_ok());
        assert!(ctx.require(Role::SurveyRead).is_ok());
    }

    #[test]
    fn test_roles_are_parsed_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-roles"),
            HeaderValue::from_static("CONFIG_READ, tag-write"),
        );

        let ctx = roles_from_headers(&headers);
        assert!(ctx.require(Role::ConfigRead).is_ok());
        assert!(ctx.require(Role::TagWrite).is_ok());
        assert!(ctx.require(Role::ConfigWrite).is_err());
    }

    #[test]
    fn test_empty_header_grants_nothing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-roles"),
            HeaderValue::from_static(""),
        );

        let ctx = roles_from_headers(&headers);
        assert!(ctx.require(Role::ConfigRead).is_err());
    }

    #[test]
    fn test_unknown_role_names_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-roles"),
            HeaderValue::from_static("SUPERUSER,SURVEY_READ"),
        );

        let ctx = roles_from_headers(&headers);
        assert!(ctx.require(Role::SurveyRead).is_ok());
        assert!(ctx.require(Role::SurveyWrite).is_err());
    }

    #[test]
    fn test_role_display_round_trips() {
        for role in [
            Role::ConfigRead,
            Role::ConfigWrite,
            Role::TagRead,
            Role::TagWrite,
            Role::SurveyRead,
            Role::SurveyWrite,
        ] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
