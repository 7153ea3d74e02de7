//! Path eligibility filtering
//!
//! Paths are compared by exact string equality against the request path.
//! No normalisation is applied, so `/health` and `/health/` are different
//! paths.

use std::collections::HashSet;

/// Decides whether a request path may be evaluated for faults
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    blacklist: HashSet<String>,
    whitelist: HashSet<String>,
}

impl PathFilter {
    /// Create a filter from blacklisted and whitelisted paths
    pub fn new<B, W>(blacklist: B, whitelist: W) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            blacklist: blacklist.into_iter().map(Into::into).collect(),
            whitelist: whitelist.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the path is explicitly excluded
    pub fn is_blacklisted(&self, path: &str) -> bool {
        self.blacklist.contains(path)
    }

    /// Whether the path passes the whitelist (an empty whitelist admits all)
    pub fn is_whitelisted(&self, path: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(path)
    }

    /// Whether faults may be evaluated for the path; the blacklist wins
    pub fn allows(&self, path: &str) -> bool {
        !self.is_blacklisted(path) && self.is_whitelisted(path)
    }

    /// Blacklisted paths
    pub const fn blacklist(&self) -> &HashSet<String> {
        &self.blacklist
    }

    /// Whitelisted paths
    pub const fn whitelist(&self) -> &HashSet<String> {
        &self.whitelist
    }
}
