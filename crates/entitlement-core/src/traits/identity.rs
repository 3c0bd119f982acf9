//! Identity provider seam. Login itself lives outside this crate.

use std::sync::Mutex;

use crate::types::UserId;

pub trait IdentityProvider {
    /// The signed-in user, or `None` when no evaluation is possible.
    fn current_user_id(&self) -> Option<UserId>;
}

/// Fixed identity, switchable between signed-in and signed-out.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    current: Mutex<Option<UserId>>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            current: Mutex::new(Some(user_id.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}
