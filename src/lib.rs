//! Receiver for AWS Client-Side Monitoring (CSM) telemetry.
//!
//! SDKs with CSM enabled send one JSON document per API call (and per attempt)
//! to a local UDP port. [`listener::Listener`] reads those datagrams,
//! [`decode::decode`] turns each into an [`Event`], and a
//! [`listener::Handler`] such as [`csv_sink::CsvSink`] consumes it.

pub mod config;
pub mod csv_sink;
pub mod data;
pub mod decode;
pub mod error;
pub mod listener;

pub use crate::csv_sink::CsvSink;
pub use crate::data::Event;
pub use crate::decode::{decode, DecodeError};
pub use crate::error::{Error, Result};
pub use crate::listener::{listen_and_serve, listen_and_serve_with_shutdown, Handler, Listener};
