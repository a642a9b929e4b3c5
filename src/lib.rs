//! # voice-server
//!
//! HTTP request/response plumbing for the embedded voice-server API.
//!
//! This library is the wire-facing half of the server: the surrounding
//! connection loop reads one complete request into a buffer, hands it to
//! [`http::parse_request`], dispatches on the parsed method and path, and
//! replies through the writers in [`response`]. Bodies declared as
//! `multipart/form-data` are decomposed into named parts by [`multipart`].
//!
//! Connection acceptance, threading, TLS, and the speech pipeline itself
//! live outside this crate. Nothing here holds state across requests, so
//! parsing and responding are safe to run concurrently per connection.

pub mod error;
pub mod http;
pub mod multipart;
pub mod response;
pub mod utils;

/// Service name stamped into the `Server` response header.
pub const NAME: &str = "voice-server";

/// Service version, taken from the crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
