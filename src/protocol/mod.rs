//! Wire format for interview backends
//!
//! Outbound control messages and audio chunks are encoded per mode; inbound
//! frames are decoded into session events.

mod codec;
mod messages;

pub use codec::Codec;
pub use messages::{ControlMessage, Frame};
