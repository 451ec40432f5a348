#![forbid(unsafe_code)]

use std::sync::Arc;

use noor_storage::keys::ONBOARDING_SEEN_KEY;
use noor_storage::{KeyValueStore, StoreError};

/// Whether this device has walked through the introduction.
pub struct OnboardingFlag {
    store: Arc<dyn KeyValueStore>,
}

impl OnboardingFlag {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn has_completed(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(ONBOARDING_SEEN_KEY)?.as_deref() == Some("true"))
    }

    pub fn mark_completed(&self) -> Result<(), StoreError> {
        self.store.set(ONBOARDING_SEEN_KEY, "true")
    }
}
