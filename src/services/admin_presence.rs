//! Process-wide "an admin account exists" flag.
//!
//! The flag only ever moves from unknown to present. While it is unset, every
//! check falls through to the database; once an admin has been seen it is
//! answered from memory for the rest of the process.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::AppResult;
use crate::infra::UserRepository;

#[derive(Debug, Default)]
pub struct AdminPresence {
    present: AtomicBool,
}

impl AdminPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an admin now exists
    pub fn mark_present(&self) {
        if !self.present.swap(true, Ordering::Release) {
            tracing::info!("Bootstrap admin registered, setup routes now require admin");
        }
    }

    pub fn is_known_present(&self) -> bool {
        self.present.load(Ordering::Acquire)
    }

    /// Answer from memory when possible, otherwise ask the user store.
    pub async fn resolve(&self, users: &dyn UserRepository) -> AppResult<bool> {
        if self.is_known_present() {
            return Ok(true);
        }

        let exists = users.has_admin().await?;
        if exists {
            self.mark_present();
        }
        Ok(exists)
    }
}
