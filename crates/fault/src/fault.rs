//! Fault dispatcher
//!
//! A [`Fault`] owns validated configuration and decides per request whether
//! its injector runs. Configuration is immutable after construction and shared
//! by all in-flight requests.

use std::{fmt, sync::Arc};

use axum::extract::Request;

use crate::{
    error::ConfigError,
    injector::{InjectFuture, Injector, Next},
    path_filter::PathFilter,
    random::{RandomSource, ThreadRandom},
};

/// Options used to build a [`Fault`]
#[derive(Debug, Clone, Default)]
pub struct FaultOptions {
    /// Whether faults are evaluated at all
    pub enabled: bool,

    /// Share of eligible requests the injector runs on, in `[0, 100]`
    pub percent_of_requests: f64,

    /// Paths never evaluated
    pub path_blacklist: Vec<String>,

    /// Paths evaluated exclusively, when non-empty
    pub path_whitelist: Vec<String>,

    /// Injector run when the fault fires
    pub injector: Option<Injector>,

    /// Source for percentage sampling (thread-local generator if unset)
    pub random: Option<Arc<dyn RandomSource>>,
}

impl FaultOptions {
    /// Options for an enabled fault with the given percent and injector
    pub fn new(percent_of_requests: f64, injector: impl Into<Injector>) -> Self {
        Self {
            enabled: true,
            percent_of_requests,
            injector: Some(injector.into()),
            ..Default::default()
        }
    }

    /// Set whether the fault is enabled
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set blacklisted paths
    #[must_use]
    pub fn with_blacklist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_blacklist = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set whitelisted paths
    #[must_use]
    pub fn with_whitelist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_whitelist = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the random source
    #[must_use]
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Arc::new(random));
        self
    }

    /// Check the options without building a fault
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.injector.is_none() {
            return Err(ConfigError::MissingInjector);
        }
        if !(0.0..=100.0).contains(&self.percent_of_requests) {
            return Err(ConfigError::InvalidPercent(self.percent_of_requests));
        }
        Ok(())
    }
}

/// Outcome of the participation checks for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The fault is disabled (or inert)
    Disabled,
    /// The path is blacklisted
    Blacklisted,
    /// A whitelist is set and the path is not on it
    NotWhitelisted,
    /// The random draw fell outside the configured percent
    SampledOut,
    /// The injector runs
    Fire,
}

impl Decision {
    /// Whether the injector runs
    pub const fn fires(self) -> bool {
        matches!(self, Self::Fire)
    }

    /// Label used in logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Blacklisted => "blacklisted",
            Self::NotWhitelisted => "not_whitelisted",
            Self::SampledOut => "sampled_out",
            Self::Fire => "fire",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fault injection middleware core
///
/// Cheap to clone; clones share the same configuration.
#[derive(Debug, Clone)]
pub struct Fault {
    inner: Arc<FaultInner>,
}

#[derive(Debug)]
struct FaultInner {
    enabled: bool,
    percent_of_requests: f64,
    filter: PathFilter,
    injector: Option<Injector>,
    random: Arc<dyn RandomSource>,
}

impl Fault {
    /// Build a fault, falling back to an inert one on invalid options
    ///
    /// Valid fields are preserved on fallback; the fault just never fires.
    pub fn new(options: FaultOptions) -> Self {
        match options.validate() {
            Ok(()) => Self::build(options, true),
            Err(e) => {
                tracing::warn!(error = %e, "Fault disabled due to invalid configuration");
                Self::build(options, false)
            },
        }
    }

    /// Build a fault, rejecting invalid options
    pub fn try_new(options: FaultOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::build(options, true))
    }

    /// A fault that passes every request through
    pub fn inert() -> Self {
        Self::build(FaultOptions::default(), false)
    }

    fn build(options: FaultOptions, valid: bool) -> Self {
        let percent_of_requests = if (0.0..=100.0).contains(&options.percent_of_requests) {
            options.percent_of_requests
        } else {
            0.0
        };
        Self {
            inner: Arc::new(FaultInner {
                enabled: valid && options.enabled,
                percent_of_requests,
                filter: PathFilter::new(options.path_blacklist, options.path_whitelist),
                injector: options.injector,
                random: options.random.unwrap_or_else(|| Arc::new(ThreadRandom)),
            }),
        }
    }

    /// Whether this fault can never fire
    pub fn is_inert(&self) -> bool {
        !self.inner.enabled
            || self.inner.injector.as_ref().is_none_or(Injector::is_inert)
    }

    /// Whether the fault is enabled
    pub fn enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Share of eligible requests the injector runs on
    pub fn percent_of_requests(&self) -> f64 {
        self.inner.percent_of_requests
    }

    /// Path filter applied before sampling
    pub fn path_filter(&self) -> &PathFilter {
        &self.inner.filter
    }

    /// Configured injector
    pub fn injector(&self) -> Option<&Injector> {
        self.inner.injector.as_ref()
    }

    /// Run the participation checks for a request path
    pub fn evaluate(&self, path: &str) -> Decision {
        let inner = &self.inner;
        if !inner.enabled || inner.injector.is_none() {
            return Decision::Disabled;
        }
        if inner.filter.is_blacklisted(path) {
            return Decision::Blacklisted;
        }
        if !inner.filter.is_whitelisted(path) {
            return Decision::NotWhitelisted;
        }
        if inner.random.percent() >= inner.percent_of_requests {
            return Decision::SampledOut;
        }
        Decision::Fire
    }

    /// Handle a request, running the injector if the fault fires
    pub fn handle(&self, request: Request, next: Next) -> InjectFuture {
        let path = request.uri().path();
        let decision = self.evaluate(path);
        metrics::counter!("fault_decisions_total", "decision" => decision.as_str()).increment(1);

        match (&self.inner.injector, decision) {
            (Some(injector), Decision::Fire) => {
                tracing::debug!(path, injector = injector.kind(), "Fault fired");
                injector.apply(request, next)
            },
            _ => {
                tracing::debug!(path, %decision, "Fault skipped");
                next.run(request)
            },
        }
    }
}

impl Default for Fault {
    fn default() -> Self {
        Self::inert()
    }
}
