//! Length-prefixed JSON frames

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Size of the length prefix in bytes
pub const HEADER_LEN: usize = 4;

/// Largest payload accepted or produced (4 MiB)
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Encode a message as `[len][json]`.
///
/// The message must serialize to a JSON object no larger than [`MAX_FRAME_LEN`].
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let value = serde_json::to_value(msg).map_err(ProtocolError::Serialization)?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }
    let payload = serde_json::to_vec(&value).map_err(ProtocolError::Serialization)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::InvalidLength(payload.len() as u64));
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a frame payload (without its prefix).
///
/// Rejects invalid JSON and any top-level value that is not an object before
/// the object is mapped onto `T`.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    let value: Value = serde_json::from_slice(payload).map_err(ProtocolError::InvalidJson)?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }
    serde_json::from_value(value).map_err(ProtocolError::Malformed)
}

/// Read one frame with the default size limit.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between frames.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    read_frame_limited(reader, MAX_FRAME_LEN).await
}

/// Read one frame, rejecting declared lengths of 0 or above `max_len`.
pub async fn read_frame_limited<R, T>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<T>, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(ProtocolError::ConnectionClosed);
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len == 0 || len > max_len {
        return Err(ProtocolError::InvalidLength(len as u64));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;

    decode_payload(&payload).map(Some)
}

/// Encode and write one frame, flushing the writer.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
