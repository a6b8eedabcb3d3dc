//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Keel
#[derive(Error, Debug)]
pub enum Error {
    /// No binding and no convention implementation can produce the capability
    #[error("Missing binding: no factory registered for {key}")]
    MissingBinding {
        /// Display form of the requested capability key
        key: String,
    },

    /// A capability was requested again while it was still being constructed
    #[error("Circular dependency: {}", chain.join(" -> "))]
    CircularDependency {
        /// Keys of the resolution chain, ending with the repeated key
        chain: Vec<String>,
    },

    /// Release called on a capability whose reference count is already zero
    #[error("Double release: {key} has no live references")]
    DoubleRelease {
        /// Display form of the released capability key
        key: String,
    },

    /// The cached instance does not have the requested type
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch {
        /// Display form of the capability key
        key: String,
        /// Name of the type the caller asked for
        expected: &'static str,
    },

    /// Resolution chain exceeded the configured depth
    #[error("Resolution depth {depth} exceeded while resolving {key}")]
    ResolutionDepthExceeded {
        /// Display form of the key being resolved when the limit was hit
        key: String,
        /// Configured maximum depth
        depth: usize,
    },

    /// A navigation was committed while a previous handoff has not settled
    #[error("Navigation pending: the previous transition has not settled")]
    NavigationPending,

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Saving or restoring state failed
    #[error("State error: {message}")]
    State {
        /// Description of the state error
        message: String,
    },

    /// Internal invariant violated
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Graph error creation methods
impl Error {
    /// Create a missing binding error
    pub fn missing_binding<S: Into<String>>(key: S) -> Self {
        Self::MissingBinding { key: key.into() }
    }

    /// Create a circular dependency error from the resolution chain
    pub fn circular_dependency<I, S>(chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CircularDependency {
            chain: chain.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a double release error
    pub fn double_release<S: Into<String>>(key: S) -> Self {
        Self::DoubleRelease { key: key.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<S: Into<String>>(key: S, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create a state error
    pub fn state<S: Into<String>>(message: S) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Classification helpers
impl Error {
    /// True for [`Error::MissingBinding`]
    pub fn is_missing_binding(&self) -> bool {
        matches!(self, Self::MissingBinding { .. })
    }

    /// True for [`Error::CircularDependency`]
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// True for [`Error::DoubleRelease`]
    pub fn is_double_release(&self) -> bool {
        matches!(self, Self::DoubleRelease { .. })
    }
}
