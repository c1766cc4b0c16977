//! Raw TCP connection handling
//!
//! A [`Connection`] owns exactly one socket at a time and moves it through
//! `open -> connected -> closed`. It also carries the two timestamps of the
//! current timed operation (connect or read) so callers can report how long
//! each stage took.
//!
//! # Read Loop
//!
//! [`Connection::read_response`] reads until the peer closes the
//! connection, governed by two independent timers:
//!
//! | Timer | Default | On expiry |
//! |-------|---------|-----------|
//! | Total deadline (from start of read) | 10s | `ConnectionTimeout` |
//! | Per-wait readiness timeout | 10s | `SocketTimeout` |
//!
//! Reading also stops with `ExceededMaxSize` once the caller's byte limit is
//! reached before the peer closes.

use crate::config::FetchConfig;
use crate::crawler::buffer::{BufferError, DynamicBuffer};
use crate::crawler::request::{build_request, Method};
use crate::crawler::verify::HTTP_SIGNATURE;
use crate::url::ParsedUrl;
use crate::FetchError;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;

/// The two timers that bound connects and reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Total wall-clock budget for a connect or a whole read
    pub connection: Duration,
    /// Longest single wait for the socket to become readable
    pub read_wait: Duration,
}

impl From<&FetchConfig> for Timeouts {
    fn from(config: &FetchConfig) -> Self {
        Self {
            connection: config.connection_timeout(),
            read_wait: config.read_wait_timeout(),
        }
    }
}

enum Socket {
    Open(TcpSocket),
    Connected(TcpStream),
    Closed,
}

/// A single reusable TCP connection
pub struct Connection {
    socket: Socket,
    timeouts: Timeouts,
    user_agent: String,
    start_time: Instant,
    stop_time: Instant,
}

impl Connection {
    /// Opens a fresh, unconnected TCP socket
    pub fn open(timeouts: Timeouts, user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let now = Instant::now();
        Ok(Self {
            socket: Socket::Open(new_socket()?),
            timeouts,
            user_agent: user_agent.into(),
            start_time: now,
            stop_time: now,
        })
    }

    /// Returns true if a socket is held (connected or not)
    pub fn is_open(&self) -> bool {
        !matches!(self.socket, Socket::Closed)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.socket, Socket::Connected(_))
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Duration of the most recent timed operation
    pub fn elapsed(&self) -> Duration {
        self.stop_time.saturating_duration_since(self.start_time)
    }

    /// Connects the open socket to `addr:port`
    ///
    /// The connect is bounded by the total connection timeout. On failure
    /// the socket is consumed and the connection must be [`reset`](Self::reset)
    /// before it can be used again.
    pub async fn connect(&mut self, addr: Ipv4Addr, port: u16) -> Result<Duration, FetchError> {
        let socket = match std::mem::replace(&mut self.socket, Socket::Closed) {
            Socket::Open(socket) => socket,
            other => {
                self.socket = other;
                return Err(FetchError::SocketState { expected: "open" });
            }
        };

        let target = SocketAddrV4::new(addr, port);
        self.start_timer();

        let result = timeout(self.timeouts.connection, socket.connect(target.into())).await;
        let elapsed = self.stop_timer();

        match result {
            Ok(Ok(stream)) => {
                self.socket = Socket::Connected(stream);
                Ok(elapsed)
            }
            Ok(Err(source)) => Err(FetchError::Connect {
                addr: target,
                source,
            }),
            Err(_) => Err(FetchError::ConnectTimeout {
                addr: target,
                elapsed,
            }),
        }
    }

    /// Closes the current socket and opens a replacement
    pub fn reset(&mut self) -> Result<(), FetchError> {
        self.socket = Socket::Closed;
        self.socket = Socket::Open(new_socket()?);
        Ok(())
    }

    /// Releases the socket
    ///
    /// Returns false if there was nothing left to release.
    pub fn close(&mut self) -> bool {
        !matches!(
            std::mem::replace(&mut self.socket, Socket::Closed),
            Socket::Closed
        )
    }

    /// Sends a request for `target` (or the URL's own request) to the server
    ///
    /// The whole request is written; partial sends are never retried.
    pub async fn write_request(
        &mut self,
        url: &ParsedUrl,
        method: Method,
        target: Option<&str>,
    ) -> Result<usize, FetchError> {
        let stream = match &mut self.socket {
            Socket::Connected(stream) => stream,
            _ => return Err(FetchError::SocketState { expected: "connected" }),
        };

        let target = target.unwrap_or_else(|| url.request());
        let request = build_request(method, target, url.host(), &self.user_agent);

        stream
            .write_all(request.as_bytes())
            .await
            .map_err(FetchError::Send)?;

        Ok(request.len())
    }

    /// Reads a full response into `buffer`
    ///
    /// The buffer is cleared first. On success the filled region holds the
    /// whole response, is followed by a zero byte, and the byte count is
    /// returned.
    ///
    /// # Errors
    ///
    /// * `SocketTimeout` - no data arrived within one readiness wait
    /// * `ConnectionTimeout` - the total deadline passed before the peer closed
    /// * `ExceededMaxSize` - `limit` bytes arrived before the peer closed
    /// * `NonHttpResponse` - the peer closed but no `HTTP/` signature was seen
    /// * `Receive` / `Buffer` - I/O or growth failure
    pub async fn read_response(
        &mut self,
        buffer: &mut DynamicBuffer,
        limit: usize,
    ) -> Result<usize, FetchError> {
        self.start_timer();

        let result = match &self.socket {
            Socket::Connected(stream) => {
                read_until_close(stream, buffer, limit, self.timeouts, self.start_time).await
            }
            _ => Err(FetchError::SocketState { expected: "connected" }),
        };

        self.stop_timer();
        result
    }

    fn start_timer(&mut self) {
        let now = Instant::now();
        self.start_time = now;
        self.stop_time = now;
    }

    fn stop_timer(&mut self) -> Duration {
        self.stop_time = Instant::now();
        self.elapsed()
    }
}

fn new_socket() -> Result<TcpSocket, FetchError> {
    TcpSocket::new_v4().map_err(FetchError::Socket)
}

async fn read_until_close(
    stream: &TcpStream,
    buffer: &mut DynamicBuffer,
    limit: usize,
    timeouts: Timeouts,
    started: Instant,
) -> Result<usize, FetchError> {
    buffer.clear();

    while started.elapsed() < timeouts.connection && buffer.len() < limit {
        match timeout(timeouts.read_wait, stream.readable()).await {
            Err(_) => {
                return Err(FetchError::SocketTimeout {
                    waited: timeouts.read_wait,
                })
            }
            Ok(Err(source)) => return Err(FetchError::Receive(source)),
            Ok(Ok(())) => {}
        }

        if buffer.free_space() == 0 {
            return Err(BufferError::Full {
                capacity: buffer.capacity(),
            }
            .into());
        }

        match stream.try_read(buffer.spare_mut()) {
            Ok(0) => return finish(buffer),
            Ok(count) => buffer.commit(count)?,
            // Spurious readiness
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(source) => return Err(FetchError::Receive(source)),
        }
    }

    if buffer.len() >= limit {
        Err(FetchError::ExceededMaxSize { limit })
    } else {
        Err(FetchError::ConnectionTimeout {
            elapsed: started.elapsed(),
        })
    }
}

/// Handles a graceful close by the peer
fn finish(buffer: &mut DynamicBuffer) -> Result<usize, FetchError> {
    buffer.terminate();

    if !buffer.contains(HTTP_SIGNATURE) {
        return Err(FetchError::NonHttpResponse);
    }

    Ok(buffer.len())
}
