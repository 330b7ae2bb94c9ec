// Session Context
// Single owner of the signed-in identity and its admin role

use crate::domain::Identity;
use crate::error::{AppError, Result};
use crate::port::IdentityProvider;
use std::sync::Arc;
use tracing::{debug, info};

/// Explicit session passed to whatever needs to know who is signed in.
///
/// Role changes take effect on the next `refresh`; nothing else re-derives
/// the role.
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    token: Option<String>,
    identity: Option<Identity>,
}

impl SessionContext {
    /// Anonymous session
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            token: None,
            identity: None,
        }
    }

    /// Resolve `token` and hold the identity it maps to
    pub async fn sign_in(&mut self, token: &str) -> Result<&Identity> {
        let identity = self
            .provider
            .resolve_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or revoked token".to_string()))?;

        debug!(user_id = %identity.user_id, role = %identity.role, "Session signed in");
        self.token = Some(token.to_string());
        let identity = self.identity.insert(identity);
        Ok(&*identity)
    }

    /// Re-resolve the held token. A revoked token signs the session out.
    pub async fn refresh(&mut self) -> Result<Option<&Identity>> {
        let Some(token) = self.token.clone() else {
            return Ok(None);
        };

        match self.provider.resolve_token(&token).await? {
            Some(identity) => {
                if self.identity.as_ref().map(|i| i.role) != Some(identity.role) {
                    info!(user_id = %identity.user_id, role = %identity.role, "Session role changed");
                }
                let identity = self.identity.insert(identity);
                Ok(Some(&*identity))
            }
            None => {
                info!("Session token revoked, signing out");
                self.sign_out();
                Ok(None)
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.token = None;
        self.identity = None;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }

    /// Fail unless the session holds an admin identity
    pub fn require_admin(&self) -> Result<&Identity> {
        match &self.identity {
            None => Err(AppError::Unauthorized("sign-in required".to_string())),
            Some(identity) if identity.is_admin() => Ok(identity),
            Some(identity) => Err(AppError::Forbidden(format!(
                "role '{}' cannot use admin endpoints",
                identity.role
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::port::identity_provider::mocks::StaticIdentityProvider;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: "user-1".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_anonymous_session_is_not_admin() {
        let session = SessionContext::new(Arc::new(StaticIdentityProvider::new()));
        assert!(!session.is_admin());
        assert!(matches!(
            session.require_admin(),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_resolves_role() {
        let provider = StaticIdentityProvider::new();
        provider.grant("tok", identity(Role::Admin));

        let mut session = SessionContext::new(Arc::new(provider));
        session.sign_in("tok").await.unwrap();
        assert!(session.is_admin());
        assert_eq!(session.require_admin().unwrap().user_id, "user-1");
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let mut session = SessionContext::new(Arc::new(StaticIdentityProvider::new()));
        assert!(matches!(
            session.sign_in("nope").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let provider = StaticIdentityProvider::new();
        provider.grant("tok", identity(Role::Editor));

        let mut session = SessionContext::new(Arc::new(provider));
        session.sign_in("tok").await.unwrap();
        assert!(matches!(
            session.require_admin(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_role_change_and_revocation() {
        let provider = StaticIdentityProvider::new();
        provider.grant("tok", identity(Role::Admin));

        let mut session = SessionContext::new(Arc::new(provider.clone()));
        session.sign_in("tok").await.unwrap();

        provider.grant("tok", identity(Role::Viewer));
        session.refresh().await.unwrap();
        assert!(!session.is_admin());
        assert_eq!(session.identity().unwrap().role, Role::Viewer);

        provider.revoke("tok");
        assert!(session.refresh().await.unwrap().is_none());
        assert!(session.identity().is_none());
        assert_eq!(provider.lookup_count(), 3);
    }
}
