//! # Protocol Listener
//!
//! One task per inbound connection; a connection may carry any number of
//! newline-framed messages, answered in order. A malformed line is logged
//! and skipped; an oversized line or I/O failure closes that connection
//! only. Nothing a client sends can stop the accept loop.

use std::net::SocketAddr;
use std::time::Duration;

use cc_05_gossip::{read_message, write_message};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::handlers::{DispatchError, Dispatcher};

/// Bound TCP listener for the node protocol.
pub struct NodeListener {
    listener: TcpListener,
    dispatcher: Dispatcher,
    write_timeout: Duration,
}

impl NodeListener {
    pub async fn bind(
        addr: &str,
        dispatcher: Dispatcher,
        write_timeout: Duration,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
            write_timeout,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips to true or its sender drops.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Listening for peers, miners and wallets");
        }
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let dispatcher = self.dispatcher.clone();
                        let write_timeout = self.write_timeout;
                        tokio::spawn(async move {
                            serve_connection(stream, remote, dispatcher, write_timeout).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Listener stopping");
                        break;
                    }
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    dispatcher: Dispatcher,
    write_timeout: Duration,
) {
    debug!(%remote, "Connection opened");
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let message = match read_message(&mut reader).await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                warn!(%remote, error = %DispatchError::from(e), "Dropping message");
                continue;
            }
            Err(e) => {
                warn!(%remote, error = %e, "Closing connection");
                break;
            }
        };

        let reply = match dispatcher.dispatch(message).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%remote, error = %e, "Handler failed");
                continue;
            }
        };

        if let Some(reply) = reply {
            match tokio::time::timeout(write_timeout, write_message(&mut write_half, &reply)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(%remote, error = %e, "Failed to write reply");
                    break;
                }
                Err(_) => {
                    warn!(%remote, "Timed out writing reply");
                    break;
                }
            }
        }
    }
    debug!(%remote, "Connection closed");
}
