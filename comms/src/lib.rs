mod endpoint;
mod error;
mod loss;
mod receiver;
mod sender;
mod transport;

use tokio::io::{AsyncRead, AsyncWrite};

pub use endpoint::{Endpoint, Role};
pub use error::ConnectErr;
pub use loss::{LOSS_SIZE, Loss, LossByteOrder};
pub use receiver::FrameReceiver;
pub use sender::FrameSender;
pub use transport::{NetTransport, Transport};

type LenType = u32;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Creates both `FrameReceiver` and `FrameSender` network channel parts.
///
/// Given a reader and a writer creates and returns both ends of the communication.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of a frame receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (FrameReceiver<R>, FrameSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (FrameReceiver::new(rx), FrameSender::new(tx))
}
