//! Writes decoded events as CSV lines.

use std::io::{self, Write};

use log::warn;

use crate::data::Event;
use crate::error::{Error, Result};
use crate::listener::Handler;

pub const HEADER: [&str; 12] = [
    "Type",
    "Region",
    "Service",
    "Api",
    "XAmznRequestId",
    "Attempts",
    "Latency",
    "Timestamp",
    "Version",
    "HttpStatusCode",
    "FinalHttpStatusCode",
    "MaxRetriesExceeded",
];

/// CSV writer over any output stream.
///
/// The header goes out on construction. Every record is flushed as soon as it
/// is written so a tailing reader sees each event immediately.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(output: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(output);
        writer.write_record(&HEADER)?;
        writer.flush()?;
        Ok(CsvSink { writer })
    }

    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        self.writer.serialize((
            &event.event_type,
            &event.region,
            &event.service,
            &event.api,
            &event.request_id,
            event.attempts,
            event.latency,
            event.timestamp,
            event.version,
            event.http_status_code,
            event.final_http_status_code,
            event.max_retries_exceeded,
        ))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|err| {
            let cause = err.error();
            Error::Io(io::Error::new(cause.kind(), cause.to_string()))
        })
    }
}

impl<W: Write> Handler for CsvSink<W> {
    fn handle(&mut self, event: Event) {
        if let Err(err) = self.write_event(&event) {
            warn!("unable to write event {}: {}", event.request_id, err);
        }
    }
}
