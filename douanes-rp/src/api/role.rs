//! Caller identity forwarded by the upstream authentication layer
//!
//! The reverse proxy in front of the service authenticates agents and
//! passes their role and id as request headers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const ROLE_HEADER: &str = "x-douanes-role";
pub const USER_HEADER: &str = "x-douanes-user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Marechal,
    Prevot,
    Admin,
    Superadmin,
}

impl Role {
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "marechal" => Some(Role::Marechal),
            "prevot" => Some(Role::Prevot),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    /// Prévôts and above manage the roster, the registry and the daily board
    pub fn is_supervisor(self) -> bool {
        !matches!(self, Role::Marechal)
    }
}

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub role: Role,
    pub user_id: Option<i64>,
}

impl Agent {
    pub fn require_supervisor(&self) -> Result<(), ApiError> {
        if self.role.is_supervisor() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Réservé aux prévôts".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Agent
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Role::from_header)
            .ok_or_else(|| ApiError::Unauthorized("Rôle manquant ou inconnu".to_string()))?;

        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        Ok(Agent { role, user_id })
    }
}
