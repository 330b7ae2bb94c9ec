// Identity Provider Port
// Resolves bearer tokens to identities and their current role

use crate::domain::Identity;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a token. Unknown or revoked tokens yield `None`.
    async fn resolve_token(&self, token: &str) -> Result<Option<Identity>>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Token table held in memory
    #[derive(Clone, Default)]
    pub struct StaticIdentityProvider {
        tokens: Arc<Mutex<HashMap<String, Identity>>>,
        lookups: Arc<Mutex<usize>>,
    }

    impl StaticIdentityProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn grant(&self, token: &str, identity: Identity) {
            self.tokens
                .lock()
                .unwrap()
                .insert(token.to_string(), identity);
        }

        pub fn revoke(&self, token: &str) {
            self.tokens.lock().unwrap().remove(token);
        }

        pub fn lookup_count(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    #[async_trait]
    impl IdentityProvider for StaticIdentityProvider {
        async fn resolve_token(&self, token: &str) -> Result<Option<Identity>> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self.tokens.lock().unwrap().get(token).cloned())
        }
    }
}
