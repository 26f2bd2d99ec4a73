//! Test utilities shared by the integration test binaries.

pub mod stub_backend;

pub use helpers::*;
pub use stub_backend::{STUB_TOKEN, StubBackend, ok};
