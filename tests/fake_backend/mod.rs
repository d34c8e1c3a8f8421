//! Fake surat backend for integration testing
//!
//! An in-process HTTP server that implements the REST endpoints the
//! client consumes, backed by in-memory data:
//!
//! TCP -> axum router -> request log -> handler -> JSON response
//!
//! ## Module layout
//!
//! - `server` -- listener, router, request recording and failure
//!   injection
//! - `handlers` -- one function per endpoint
//! - `data` -- test data model (users, mail, activity, builder)

mod data;
mod handlers;
mod server;

pub use data::{BackendBuilder, RecordedRequest, Upload};
pub use server::FakeBackend;
