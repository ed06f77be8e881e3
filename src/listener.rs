//! UDP receive loop for CSM datagrams.
//!
//! A [`Listener`] owns one UDP socket. Each datagram is decoded on the loop
//! task and handed to a [`Handler`] before the next one is read, so handlers
//! see events in arrival order and never run concurrently with themselves.
//! Datagrams that fail to arrive cleanly or fail to decode are dropped and the
//! loop keeps going.
//!
//! # Example
//!
//! ```no_run
//! use csm_receiver::listener::Listener;
//! use tokio::sync::oneshot;
//!
//! # async fn run() -> csm_receiver::error::Result<()> {
//! let (stop_tx, stop_rx) = oneshot::channel::<()>();
//! let listener = Listener::bind("127.0.0.1:31000").await?;
//! let server = tokio::spawn(listener.serve_with_shutdown(
//!     |event: csm_receiver::Event| println!("{} {}", event.service, event.api),
//!     stop_rx,
//! ));
//!
//! // ... later
//! let _ = stop_tx.send(());
//! # let _ = server.await;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::{self, Future};
use std::net::SocketAddr;

use log::{debug, info, trace};
use tokio::net::UdpSocket;

use crate::data::Event;
use crate::decode;
use crate::error::{Error, Result};

/// Receive buffer size. CSM messages are a few hundred bytes; anything that
/// fills the buffer has been truncated by the OS and will normally fail to
/// decode.
pub const MAX_DATAGRAM_SIZE: usize = 8 * 1024;

/// Receives each successfully decoded event.
pub trait Handler {
    fn handle(&mut self, event: Event);
}

impl<F> Handler for F
where
    F: FnMut(Event),
{
    fn handle(&mut self, event: Event) {
        self(event)
    }
}

/// Lifecycle of a [`Listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Created,
    Bound,
    Serving,
    Stopping,
    Stopped,
    Failed,
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerState::Created => write!(f, "Created"),
            ListenerState::Bound => write!(f, "Bound"),
            ListenerState::Serving => write!(f, "Serving"),
            ListenerState::Stopping => write!(f, "Stopping"),
            ListenerState::Stopped => write!(f, "Stopped"),
            ListenerState::Failed => write!(f, "Failed"),
        }
    }
}

pub struct Listener {
    socket: UdpSocket,
    local_addr: SocketAddr,
    state: ListenerState,
}

impl Listener {
    /// Binds a UDP socket on `addr` (`host:port`).
    ///
    /// Bind failures are returned immediately and never retried.
    pub async fn bind(addr: &str) -> Result<Listener> {
        let bound = match UdpSocket::bind(addr).await {
            Ok(socket) => socket.local_addr().map(|local_addr| (socket, local_addr)),
            Err(err) => Err(err),
        };
        let (socket, local_addr) = bound.map_err(|source| {
            debug!("listener on {}: {}", addr, ListenerState::Failed);
            Error::Bind {
                addr: addr.to_owned(),
                source,
            }
        })?;

        let mut listener = Listener {
            socket,
            local_addr,
            state: ListenerState::Created,
        };
        listener.enter(ListenerState::Bound);
        Ok(listener)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Serves until the process exits.
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        self.serve_with_shutdown(handler, future::pending::<()>())
            .await
    }

    /// Serves until `signal` completes, then releases the socket and returns
    /// `Ok(())`.
    ///
    /// The signal's output is ignored, so a `oneshot::Receiver` stops the
    /// listener either when a value is sent or when its sender is dropped.
    pub async fn serve_with_shutdown<H, S>(mut self, mut handler: H, signal: S) -> Result<()>
    where
        H: Handler,
        S: Future,
    {
        tokio::pin!(signal);
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        self.enter(ListenerState::Serving);
        info!("listening for CSM events on udp://{}", self.local_addr);

        loop {
            let received = tokio::select! {
                _ = &mut signal => None,
                received = self.socket.recv_from(&mut buf) => Some(received),
            };

            match received {
                None => break,
                Some(Ok((len, peer))) => dispatch(&buf[..len], peer, &mut handler),
                Some(Err(err)) => debug!("receive failed, datagram dropped: {}", err),
            }
        }

        self.enter(ListenerState::Stopping);
        let Listener {
            socket, local_addr, ..
        } = self;
        drop(socket);
        debug!("listener on {}: {}", local_addr, ListenerState::Stopped);
        info!("stopped listening on udp://{}", local_addr);
        Ok(())
    }

    fn enter(&mut self, state: ListenerState) {
        debug!("listener on {}: {} -> {}", self.local_addr, self.state, state);
        self.state = state;
    }
}

fn dispatch<H: Handler>(datagram: &[u8], peer: SocketAddr, handler: &mut H) {
    if datagram.len() == MAX_DATAGRAM_SIZE {
        debug!(
            "datagram from {} filled the {} byte buffer and may be truncated",
            peer, MAX_DATAGRAM_SIZE
        );
    }

    match decode::decode_bytes(datagram) {
        Ok(event) => {
            trace!(
                "{} {}.{} at {} from {} ({})",
                event.event_type,
                event.service,
                event.api,
                event.time().map(|t| t.to_rfc3339()).unwrap_or_default(),
                peer,
                event.request_id
            );
            handler.handle(event);
        }
        Err(err) => debug!("dropping datagram from {}: {}", peer, err),
    }
}

/// Binds `addr` and serves forever.
pub async fn listen_and_serve<H: Handler>(addr: &str, handler: H) -> Result<()> {
    Listener::bind(addr).await?.serve(handler).await
}

/// Binds `addr` and serves until `signal` completes.
pub async fn listen_and_serve_with_shutdown<H, S>(addr: &str, handler: H, signal: S) -> Result<()>
where
    H: Handler,
    S: Future,
{
    Listener::bind(addr)
        .await?
        .serve_with_shutdown(handler, signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(ListenerState::Created.to_string(), "Created");
        assert_eq!(ListenerState::Serving.to_string(), "Serving");
        assert_eq!(ListenerState::Stopped.to_string(), "Stopped");
    }

    #[test]
    fn dispatch_skips_undecodable_datagrams() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let mut seen = Vec::new();
        let mut handler = |event: Event| seen.push(event.api);

        dispatch(b"", peer, &mut handler);
        dispatch(b"{not json", peer, &mut handler);
        dispatch(br#"{"Api":"PutItem"}"#, peer, &mut handler);

        assert_eq!(seen, vec!["PutItem".to_owned()]);
    }
}
