use std::{io, net::SocketAddr};

use log::info;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

use crate::{ConnectErr, Endpoint, FrameReceiver, FrameSender, Role};

/// A transport running over the single tcp connection of the process.
pub type NetTransport = Transport<OwnedReadHalf, OwnedWriteHalf>;

/// A bidirectional, length-prefixed message channel.
///
/// There is exactly one reader and one writer, so messages in each
/// direction are delivered in the order they were sent.
pub struct Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: FrameReceiver<R>,
    tx: FrameSender<W>,
    peer: Option<SocketAddr>,
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Transport` over an already established stream.
    ///
    /// # Arguments
    /// * `rx` - The reading half.
    /// * `tx` - The writing half.
    pub fn new(rx: R, tx: W) -> Self {
        let (rx, tx) = crate::channel(rx, tx);
        Self { rx, tx, peer: None }
    }

    /// Sends `payload` as one message.
    ///
    /// # Returns
    /// The amount of payload bytes sent.
    pub async fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.tx.send(payload).await
    }

    /// Receives the next message.
    ///
    /// # Returns
    /// `None` if the peer disconnected in an orderly fashion.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.rx.recv().await
    }

    /// Receives the next message into `buf`, see `FrameReceiver::recv_into`.
    pub async fn recv_into<'buf>(&mut self, buf: &'buf mut Vec<u8>) -> io::Result<Option<&'buf [u8]>> {
        self.rx.recv_into(buf).await
    }

    /// Closes the sending direction so the peer observes the end of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.tx.shutdown().await
    }

    /// The remote address, if the transport runs over a socket.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl NetTransport {
    /// Establishes the link described by `endpoint`.
    ///
    /// A server binds to the endpoint and blocks until exactly one peer
    /// connects, the listener is dropped afterwards. A client connects
    /// once and fails fast if nobody is listening.
    ///
    /// # Arguments
    /// * `endpoint` - Where and how to bootstrap the connection.
    ///
    /// # Returns
    /// The connected transport or a `ConnectErr`.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectErr> {
        let addr = endpoint.authority();
        let role = endpoint.role();
        let wrap = |source| ConnectErr {
            addr: addr.clone(),
            role,
            source,
        };

        let (stream, peer) = match role {
            Role::Server => {
                let list = TcpListener::bind(&addr).await.map_err(wrap)?;
                info!("listening at {addr}");

                list.accept().await.map_err(wrap)?
            }
            Role::Client => {
                info!("connecting to {addr}");
                let stream = TcpStream::connect(&addr).await.map_err(wrap)?;
                let peer = stream.peer_addr().map_err(wrap)?;
                (stream, peer)
            }
        };

        stream.set_nodelay(true).map_err(wrap)?;
        info!("connection established with {peer}");

        let (rx, tx) = stream.into_split();
        let mut transport = Self::new(rx, tx);
        transport.peer = Some(peer);
        Ok(transport)
    }
}
