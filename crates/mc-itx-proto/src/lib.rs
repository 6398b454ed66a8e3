//! Bedrock Edition protocol messages used by the item stack transaction engine.
//!
//! Only the messages the engine exchanges with the server are modelled here:
//! item stack requests and responses, inventory contents and container
//! open/close. Transport framing (RakNet, batching, compression) lives
//! elsewhere.

pub mod codec;
pub mod container;
pub mod error;
pub mod item_stack;
pub mod packets;
pub mod types;

pub use container::ContainerId;
pub use error::ProtoError;
pub use item_stack::ItemStack;
pub use packets::{ClientPacket, ServerPacket};
