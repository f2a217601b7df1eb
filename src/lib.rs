mod client;
mod codec;
mod group;
mod listener;
mod prime;
mod session;
mod transport;

pub use client::SrpClient;
pub use codec::{
    biguint_to_bytes, biguint_to_hex, bytes_to_hex, hex_to_biguint, hex_to_bytes, CodecError,
    FrameError,
};
pub use group::{GroupError, GroupParameters};
pub use listener::{accept_loop, spawn_server};
pub use session::{
    Credential, HandshakeOutcome, RejectReason, SessionError, SrpServer, SALT_LEN,
    SESSION_KEY_LEN,
};
pub use transport::{FrameTransport, LineTransport};
