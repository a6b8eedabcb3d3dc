//! Domain layer constants

/// Display name used for keys without a qualifier
pub const UNQUALIFIED: &str = "<default>";

/// State keeper key under which the navigation history is saved
pub const NAVIGATION_STATE_KEY: &str = "keel.navigation.history";

/// Prefix for state keeper keys of stateful graph instances
pub const GRAPH_STATE_PREFIX: &str = "keel.graph.";
