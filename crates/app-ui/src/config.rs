//! Navigation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::navigation::{NavigationError, Result};
use crate::tokens::duration;

/// Navigation settings, loaded from JSON with every field optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    /// Path of the bottom entry on a cold start
    pub start_route: String,
    /// Screen enter/exit length in milliseconds
    pub screen_transition_ms: u64,
    /// Shared-element morph length in milliseconds
    pub shared_element_ms: u64,
    /// Animation driver tick in milliseconds
    pub frame_interval_ms: u64,
    /// Screen-issued navigations applied per transaction before the rest are dropped
    pub max_redirect_depth: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            start_route: "onboarding".to_string(),
            screen_transition_ms: u64::from(duration::SLOW),
            shared_element_ms: u64::from(duration::EXTRA_SLOW),
            frame_interval_ms: 16,
            max_redirect_depth: 8,
        }
    }
}

impl NavigationConfig {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            tracing::error!(error = %e, "invalid navigation config");
            NavigationError::Config(e)
        })
    }

    /// Start at `path` instead of the default
    pub fn with_start_route(mut self, path: impl Into<String>) -> Self {
        self.start_route = path.into();
        self
    }

    /// Screen enter/exit length
    pub fn screen_transition(&self) -> Duration {
        Duration::from_millis(self.screen_transition_ms)
    }

    /// Shared-element morph length
    pub fn shared_element(&self) -> Duration {
        Duration::from_millis(self.shared_element_ms)
    }

    /// Animation driver tick
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
