//! Engine errors.

use mc_itx_proto::ProtoError;
use thiserror::Error;

use crate::transaction::CreativeSource;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no container is open")]
    NoOpenContainer,

    #[error("window {window} is not the open container")]
    WindowNotOpen { window: u8 },

    #[error("open container has type {actual}, operation needs type {expected}")]
    WrongContainerType { expected: u8, actual: u8 },

    #[error("no request role for slot {slot} of window {window}")]
    UnresolvedRole { window: u8, slot: u8 },

    #[error("slot {slot} of window {window} is not available")]
    MissingSlot { window: u8, slot: u8 },

    #[error("item type of creative source {0:?} is unknown")]
    UnknownCreativeItem(CreativeSource),

    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered request ids that were never registered or were
    /// already consumed. Engine and server state have diverged.
    #[error("item stack responses desynchronized, unknown request ids {request_ids:?}")]
    Desynchronized { request_ids: Vec<i32> },

    #[error("completion for request {0} was dropped before the server answered")]
    CompletionDropped(i32),

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether the session must be torn down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Desynchronized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_desync_is_fatal() {
        assert!(EngineError::Desynchronized {
            request_ids: vec![-9]
        }
        .is_fatal());
        assert!(!EngineError::NoOpenContainer.is_fatal());
        assert!(!EngineError::Transport("closed".into()).is_fatal());
    }
}
