//! Infrastructure layer constants
//!
//! Domain-wide constants are defined in `keel_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "keel.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "keel";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "KEEL";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// GRAPH CONSTANTS
// ============================================================================

/// Default limit on the length of one resolution chain
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

// ============================================================================
// NAVIGATION CONSTANTS
// ============================================================================

/// Arena size above which unreachable locations are collected
pub const DEFAULT_HISTORY_GC_THRESHOLD: usize = 256;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "KEEL_LOG";

/// File stem used when the log file path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "keel";
