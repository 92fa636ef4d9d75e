//! Role-based publish authorization.

use crate::constants::PUBLISHER_ROLES;
use crate::error::PublishError;
use crate::model::PublishRequest;
use crate::pipeline::{Authorization, Authorizer};

/// Authorizes a fixed caller by role, e.g. the operator running the CLI.
#[derive(Debug, Clone)]
pub struct RoleAuthorizer {
    principal: Option<String>,
    role: String,
}

impl RoleAuthorizer {
    pub fn new(principal: Option<String>, role: impl Into<String>) -> Self {
        Self {
            principal: principal
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            role: role.into(),
        }
    }

    fn role_may_publish(&self) -> bool {
        let role = self.role.trim();
        PUBLISHER_ROLES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(role))
    }
}

#[async_trait::async_trait]
impl Authorizer for RoleAuthorizer {
    async fn authorize(&self, request: &PublishRequest) -> Result<Authorization, PublishError> {
        let allowed = self.principal.is_some() && self.role_may_publish();
        log::debug!(
            "Authorization for rating {}: principal={:?} role={} allowed={}",
            request.rating_id,
            self.principal,
            self.role,
            allowed
        );
        Ok(Authorization {
            allowed,
            principal: self.principal.clone(),
        })
    }
}
