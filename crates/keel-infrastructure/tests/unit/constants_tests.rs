//! Constants Tests

use keel_infrastructure::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_FILENAME,
    DEFAULT_HISTORY_GC_THRESHOLD, DEFAULT_MAX_RESOLUTION_DEPTH, LOG_FILTER_ENV,
};

#[test]
fn test_config_constants() {
    assert!(DEFAULT_CONFIG_FILENAME.ends_with(".toml"));
    assert_eq!(CONFIG_ENV_SEPARATOR, "__");
    assert!(LOG_FILTER_ENV.starts_with(CONFIG_ENV_PREFIX));
}

#[test]
fn test_limits_are_positive() {
    assert!(DEFAULT_MAX_RESOLUTION_DEPTH > 0);
    assert!(DEFAULT_HISTORY_GC_THRESHOLD > 0);
}
