//! Integration tests for docker-tool
//!
//! The shuttle tests run the bulk commands against an in-memory engine; the
//! docker tests need a running daemon and only build with `--features docker`.

pub mod docker;
