//! Application state for the ERP calculation engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::repository::{InMemoryPaymentRepository, PaymentRepository};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded campus configuration and the payment store.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    payments: Arc<dyn PaymentRepository>,
}

impl AppState {
    /// Creates application state backed by an empty in-memory payment store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_repository(config, Arc::new(InMemoryPaymentRepository::new()))
    }

    /// Creates application state with a caller-supplied payment store.
    pub fn with_repository(config: ConfigLoader, payments: Arc<dyn PaymentRepository>) -> Self {
        Self {
            config: Arc::new(config),
            payments,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the payment store.
    pub fn payments(&self) -> &dyn PaymentRepository {
        self.payments.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_payment_store() {
        let config = ConfigLoader::load("./config/campus").unwrap();
        let state = AppState::new(config);
        let clone = state.clone();

        assert_eq!(state.payments().count().unwrap(), 0);
        assert_eq!(clone.payments().count().unwrap(), 0);
        assert!(Arc::ptr_eq(&state.payments, &clone.payments));
    }
}
