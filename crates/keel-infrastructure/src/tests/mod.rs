//! Tests for crate-private behavior
