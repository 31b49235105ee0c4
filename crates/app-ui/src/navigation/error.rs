//! Navigation errors
//!
//! Every variant is a configuration or programming error. Missing transient
//! payloads and interrupted animations are handled in place and never show up
//! here.

use super::route::RouteKind;

/// Navigation configuration and resolution errors
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// No registered pattern matches the path
    #[error("No route matches path: {0}")]
    UnknownRoute(String),

    /// Pattern text does not follow the route grammar
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A declared parameter has no segment or query slot in the pattern
    #[error("Route pattern '{pattern}' declares parameter '{name}' but never uses it")]
    PatternMismatch {
        /// The offending pattern
        pattern: String,
        /// The unused parameter name
        name: String,
    },

    /// The pattern uses a parameter that was not declared
    #[error("Route pattern '{pattern}' uses undeclared parameter '{name}'")]
    UndeclaredParam {
        /// The offending pattern
        pattern: String,
        /// The undeclared parameter name
        name: String,
    },

    /// A route kind was registered twice
    #[error("Route {0:?} is already registered")]
    DuplicateRoute(RouteKind),

    /// Two kinds share one pattern
    #[error("Pattern '{0}' is already registered")]
    DuplicatePattern(String),

    /// A route kind has no descriptor in the table
    #[error("Route {0:?} is not registered")]
    UnregisteredRoute(RouteKind),

    /// Path generation lacked a required parameter
    #[error("Missing parameter '{name}' for route {kind:?}")]
    MissingParam {
        /// Route being rendered to a path
        kind: RouteKind,
        /// Parameter that had no value
        name: String,
    },

    /// A fallback target would itself need a transient payload
    #[error("Recovery route {0:?} depends on a transient payload")]
    RecoveryRequiresPayload(RouteKind),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
