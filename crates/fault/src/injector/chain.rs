//! Chain injector
//!
//! Composes several injectors into one unit. The sequence is folded right to
//! left into a single [`Next`] continuation, so the first injector runs first
//! and each injector decides whether the remainder of the chain runs at all.

use std::sync::Arc;

use axum::extract::Request;

use super::{InjectFuture, Injector, Next};
use crate::error::ConfigError;

/// Runs injectors strictly in declared order
#[derive(Debug, Clone)]
pub struct ChainInjector {
    injectors: Arc<[Injector]>,
}

impl ChainInjector {
    /// Create a chain, falling back to inert when empty
    pub fn new(injectors: impl IntoIterator<Item = Injector>) -> Self {
        Self::try_new(injectors).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Chain injector disabled");
            Self::inert()
        })
    }

    /// Create a chain, rejecting an empty sequence
    pub fn try_new(injectors: impl IntoIterator<Item = Injector>) -> Result<Self, ConfigError> {
        let injectors: Arc<[Injector]> = injectors.into_iter().collect();
        if injectors.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        Ok(Self { injectors })
    }

    /// A chain that always passes through
    pub fn inert() -> Self {
        Self {
            injectors: Arc::from([]),
        }
    }

    /// Whether the chain passes every request through
    ///
    /// True when empty or when every member is itself inert.
    pub fn is_inert(&self) -> bool {
        self.injectors.iter().all(Injector::is_inert)
    }

    /// Injectors in execution order
    pub fn injectors(&self) -> &[Injector] {
        &self.injectors
    }

    /// Fold the chain around `next` into a single continuation
    ///
    /// Running the returned continuation runs the first injector, whose own
    /// continuation runs the second, and so on until `next`.
    pub fn compose(&self, next: Next) -> Next {
        self.injectors.iter().rev().fold(next, |next, injector| {
            let injector = injector.clone();
            Next::new(move |request| injector.apply(request, next))
        })
    }

    pub(crate) fn apply(&self, request: Request, next: Next) -> InjectFuture {
        self.compose(next).run(request)
    }
}
