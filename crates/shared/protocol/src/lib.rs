//! Bazaar Protocol
//!
//! Wire protocol shared by every Bazaar service:
//! - `frame`: 4-byte big-endian length prefix + UTF-8 JSON object
//! - `envelope`: `Request {req_id, role, action, data}` / `Response {req_id, ok, error, data}`
//! - `params`: typed extraction of fields from a request's `data` object
//! - `server`: the [`Service`] seam and the framed TCP accept loop
//!
//! ## Frame layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ len: u32 (BE)│ payload: len bytes of JSON   │
//! └──────────────┴──────────────────────────────┘
//!   0 < len <= MAX_FRAME_LEN, payload is an object
//! ```
//!
//! Any framing fault is a [`ProtocolError`] and closes the connection.
//! Business failures never are: they travel back as a `Response` with
//! `ok = false` and the connection stays open.

pub mod envelope;
pub mod error;
pub mod frame;
pub mod params;
pub mod server;
pub mod store_actions;

pub use envelope::{ErrorBody, Request, Response};
pub use error::ProtocolError;
pub use frame::{
    HEADER_LEN, MAX_FRAME_LEN, decode_payload, encode_frame, read_frame, read_frame_limited,
    write_frame,
};
pub use params::Params;
pub use server::{FrameServer, Service, serve_connection};
