//! Serde configuration for faults
//!
//! Mirrors [`FaultOptions`] in a form that can be loaded from files or the
//! environment. Building from configuration follows the same rules as the
//! programmatic constructors: [`FaultConfig::build`] never fails and falls
//! back to inert components, [`FaultConfig::try_build`] reports the first
//! invalid one.

use std::sync::Arc;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    fault::{Fault, FaultOptions},
    injector::{ChainInjector, ErrorInjector, Injector, SlowInjector},
    random::{RandomSource, SeededRandom},
};

/// Fault configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Enable fault injection
    #[serde(default)]
    pub enabled: bool,

    /// Share of eligible requests to inject into, in `[0, 100]`
    #[serde(default)]
    pub percent_of_requests: f64,

    /// Exact paths never evaluated
    #[serde(default)]
    pub path_blacklist: Vec<String>,

    /// Exact paths evaluated exclusively (empty = all paths)
    #[serde(default)]
    pub path_whitelist: Vec<String>,

    /// Injector to run when the fault fires
    #[serde(default)]
    pub injector: Option<InjectorConfig>,

    /// Seed for reproducible sampling (thread-local generator if unset)
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Injector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InjectorConfig {
    /// Reject without a response
    Reject,

    /// Respond with a status code
    Error {
        /// HTTP status code to respond with
        status_code: u16,
    },

    /// Delay before continuing
    Slow {
        /// Delay in milliseconds; negative values are invalid
        delay_ms: i64,
    },

    /// Run injectors in order
    Chain {
        /// Injectors in execution order
        #[serde(default)]
        injectors: Vec<InjectorConfig>,
    },
}

impl InjectorConfig {
    /// Build the injector, using inert fallbacks for invalid settings
    pub fn build(&self) -> Injector {
        match self {
            Self::Reject => Injector::reject(),
            Self::Error { status_code } => Injector::error(*status_code),
            Self::Slow { delay_ms } => {
                Injector::Slow(SlowInjector::from_delta(delay_from_millis(*delay_ms)))
            },
            Self::Chain { injectors } => Injector::chain(injectors.iter().map(Self::build)),
        }
    }

    /// Build the injector, rejecting invalid settings anywhere in the tree
    pub fn try_build(&self) -> Result<Injector, ConfigError> {
        Ok(match self {
            Self::Reject => Injector::reject(),
            Self::Error { status_code } => ErrorInjector::try_new(*status_code)?.into(),
            Self::Slow { delay_ms } => {
                SlowInjector::try_from_delta(delay_from_millis(*delay_ms))?.into()
            },
            Self::Chain { injectors } => {
                let injectors = injectors
                    .iter()
                    .map(Self::try_build)
                    .collect::<Result<Vec<_>, _>>()?;
                ChainInjector::try_new(injectors)?.into()
            },
        })
    }
}

/// `i64::MIN` milliseconds is outside `TimeDelta`'s range; saturate it
fn delay_from_millis(delay_ms: i64) -> TimeDelta {
    TimeDelta::try_milliseconds(delay_ms).unwrap_or(TimeDelta::MIN)
}

impl FaultConfig {
    /// Convert into fault options, using inert fallbacks for invalid injectors
    pub fn to_options(&self) -> FaultOptions {
        self.options_with(self.injector.as_ref().map(InjectorConfig::build))
    }

    /// Build the fault, never failing
    pub fn build(&self) -> Fault {
        Fault::new(self.to_options())
    }

    /// Build the fault, reporting the first invalid setting
    pub fn try_build(&self) -> Result<Fault, ConfigError> {
        let injector = self
            .injector
            .as_ref()
            .map(InjectorConfig::try_build)
            .transpose()?;
        Fault::try_new(self.options_with(injector))
    }

    fn options_with(&self, injector: Option<Injector>) -> FaultOptions {
        FaultOptions {
            enabled: self.enabled,
            percent_of_requests: self.percent_of_requests,
            path_blacklist: self.path_blacklist.clone(),
            path_whitelist: self.path_whitelist.clone(),
            injector,
            random: self
                .random_seed
                .map(|seed| Arc::new(SeededRandom::new(seed)) as Arc<dyn RandomSource>),
        }
    }
}
