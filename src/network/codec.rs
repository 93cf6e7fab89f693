//! Frame and envelope codec.
//!
//! Every wire message is one length-delimited frame whose body is a bincode
//! envelope. Frame sizes are capped so a misbehaving peer cannot force an
//! unbounded allocation.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio_util::codec::Framed;
use tokio_util::codec::LengthDelimitedCodec;

use crate::errors::Error;
use crate::errors::Result;
use crate::errors::TransportError;

/// A TLS (or plain) byte stream carrying length-delimited frames.
pub type FramedConn<T> = Framed<T, LengthDelimitedCodec>;

/// Wraps a byte stream in the frame codec with the given size cap.
pub fn frame<T>(io: T, max_frame_bytes: usize) -> FramedConn<T>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(
        io,
        LengthDelimitedCodec::builder()
            .max_frame_length(max_frame_bytes)
            .new_codec(),
    )
}

pub fn encode_envelope<T: Serialize>(msg: &T) -> Result<Bytes> {
    let body = bincode::serialize(msg)
        .map_err(|e| Error::Transport(TransportError::Codec(e.to_string())))?;
    Ok(Bytes::from(body))
}

pub fn decode_envelope<T: DeserializeOwned>(frame: &[u8]) -> Result<T> {
    bincode::deserialize(frame)
        .map_err(|e| Error::Transport(TransportError::Codec(e.to_string())))
}
