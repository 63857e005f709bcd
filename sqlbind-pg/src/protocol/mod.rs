//! Pure protocol layer: message encoding/decoding and authentication math.
//! No I/O lives here; the driver layer owns the socket.

pub mod auth;
pub mod types;
pub mod wire;

pub use auth::{md5_password, ScramClient};
pub use wire::{
    BackendMessage, DecodeError, DescribeTarget, ErrorFields, FieldDescription, FrontendMessage,
    TransactionStatus,
};
