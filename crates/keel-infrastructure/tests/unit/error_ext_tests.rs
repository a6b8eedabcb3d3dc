//! Error Extension Tests

use keel_domain::error::{Error, Result};
use keel_infrastructure::error_ext::ErrorContext;
use std::io;

fn not_found() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "file not found")
}

#[test]
fn test_io_context() {
    let result: Result<()> = Err(not_found()).io_context("failed to read file");

    if let Err(Error::Io { source, message }) = result {
        assert!(message.contains("failed to read file"));
        assert!(message.contains("file not found"));
        assert!(source.is_some());
    } else {
        panic!("Expected Io error");
    }
}

#[test]
fn test_config_context_keeps_source() {
    let result: Result<()> = Err(not_found()).config_context("bad config");

    match result {
        Err(Error::Configuration { message, source }) => {
            assert!(message.starts_with("bad config"));
            assert!(source.is_some());
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_lazy_context_only_on_error() {
    let ok: std::result::Result<u8, io::Error> = Ok(7);
    let value = ok
        .with_context(|| -> String { panic!("context must not be built") })
        .unwrap();
    assert_eq!(value, 7);

    let result: Result<()> = Err(not_found()).with_context(|| "lookup".to_string());
    assert!(matches!(result, Err(Error::Internal { .. })));
}

#[test]
fn test_state_context() {
    let result: Result<()> = Err(not_found()).state_context("restore");

    assert!(matches!(result, Err(Error::State { .. })));
}
