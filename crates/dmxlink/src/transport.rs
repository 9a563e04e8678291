//! Datagram transport used by the scheduler
//!
//! The scheduler only needs "send these bytes to host:port and tell me how it
//! went". [`UdpTransport`] is the real implementation; tests plug in their own.

use std::io;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::net::UdpSocket;

use crate::{config::ArtNetConfig, Result};

/// Asynchronous "send bytes to host:port" capability
pub trait Transport: Send + Sync + 'static {
    /// Start sending one complete datagram.
    ///
    /// The returned future resolves once the transport has accepted or
    /// rejected the frame. It must not borrow `self`, so sends for different
    /// universes can be in flight at the same time.
    fn send(&self, frame: Vec<u8>, host: &str, port: u16) -> BoxFuture<'static, io::Result<()>>;

    /// Release any resources held by the transport
    fn close(&self) {}
}

/// UDP transport with broadcast enabled
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind an ephemeral UDP port on `config.bind_address` and enable broadcast
    pub async fn bind(config: &ArtNetConfig) -> Result<Self> {
        let socket = UdpSocket::bind((config.bind_address.as_str(), 0)).await?;
        socket.set_broadcast(true)?;

        tracing::info!(
            "Art-Net UDP transport bound to {}",
            socket.local_addr()?
        );

        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Local address of the underlying socket
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpTransport {
    fn send(&self, frame: Vec<u8>, host: &str, port: u16) -> BoxFuture<'static, io::Result<()>> {
        let socket = Arc::clone(&self.socket);
        let host = host.to_string();
        async move {
            let sent = socket.send_to(&frame, (host.as_str(), port)).await?;
            if sent != frame.len() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("short datagram: {} of {} bytes", sent, frame.len()),
                ));
            }
            Ok(())
        }
        .boxed()
    }
}
