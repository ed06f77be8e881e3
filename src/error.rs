use std::io;

use thiserror::Error;

/// Errors surfaced to callers of the receiver.
///
/// Per-datagram failures (receive errors, undecodable payloads) never show up
/// here; the listener drops those datagrams and keeps serving.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to bind UDP socket on {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
