//! Container lifecycle: NeverOpened -> Opening -> Closed -> Opening -> ...
//!
//! The tracker is the only source of the live window id used to address
//! slots of an opened container.

use std::sync::{Mutex, PoisonError};

use mc_itx_proto::packets::{ContainerClose, ContainerOpen};
use mc_itx_proto::types::BlockPos;
use tracing::debug;

use crate::mirror::WindowId;

/// The currently open container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub window_id: WindowId,
    pub container_type: u8,
    pub position: BlockPos,
    pub entity_unique_id: i64,
}

impl From<&ContainerOpen> for ContainerDescriptor {
    fn from(packet: &ContainerOpen) -> Self {
        Self {
            window_id: packet.window_id,
            container_type: packet.container_type,
            position: packet.position,
            entity_unique_id: packet.entity_unique_id,
        }
    }
}

/// The last closed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedContainer {
    pub window_id: WindowId,
    /// The server closed the window on its own.
    pub server_initiated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContainerState {
    #[default]
    NeverOpened,
    Opening(ContainerDescriptor),
    Closed(ClosedContainer),
}

type OpenHook = Box<dyn FnOnce(&ContainerDescriptor) + Send>;
type CloseHook = Box<dyn FnOnce(&ClosedContainer) + Send>;

#[derive(Default)]
struct TrackerInner {
    state: ContainerState,
    open_hook: Option<OpenHook>,
    close_hook: Option<CloseHook>,
}

#[derive(Default)]
pub struct ContainerTracker {
    inner: Mutex<TrackerInner>,
}

impl ContainerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContainerState {
        self.lock().state.clone()
    }

    /// The open container, and whether one is open.
    pub fn container_data(&self) -> (Option<ContainerDescriptor>, bool) {
        match &self.lock().state {
            ContainerState::Opening(desc) => (Some(desc.clone()), true),
            _ => (None, false),
        }
    }

    /// The container closed most recently, if the last transition was a close.
    pub fn closed_data(&self) -> Option<ClosedContainer> {
        match &self.lock().state {
            ContainerState::Closed(closed) => Some(closed.clone()),
            _ => None,
        }
    }

    /// Run `hook` once, on the next container open.
    pub fn on_open(&self, hook: impl FnOnce(&ContainerDescriptor) + Send + 'static) {
        self.lock().open_hook = Some(Box::new(hook));
    }

    /// Run `hook` once, on the next container close.
    pub fn on_close(&self, hook: impl FnOnce(&ClosedContainer) + Send + 'static) {
        self.lock().close_hook = Some(Box::new(hook));
    }

    pub(crate) fn clear_close_hook(&self) {
        self.lock().close_hook = None;
    }

    pub fn handle_open(&self, packet: &ContainerOpen) -> ContainerDescriptor {
        let desc = ContainerDescriptor::from(packet);
        debug!(
            "Container opened: window {} type {} at {}",
            desc.window_id, desc.container_type, desc.position
        );
        let hook = {
            let mut inner = self.lock();
            inner.state = ContainerState::Opening(desc.clone());
            inner.open_hook.take()
        };
        if let Some(hook) = hook {
            hook(&desc);
        }
        desc
    }

    pub fn handle_close(&self, packet: &ContainerClose) -> ClosedContainer {
        let closed = ClosedContainer {
            window_id: packet.window_id,
            server_initiated: packet.server_initiated,
        };
        debug!(
            "Container closed: window {} (server initiated: {})",
            closed.window_id, closed.server_initiated
        );
        let hook = {
            let mut inner = self.lock();
            inner.state = ContainerState::Closed(closed.clone());
            inner.close_hook.take()
        };
        if let Some(hook) = hook {
            hook(&closed);
        }
        closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_itx_proto::container::container_type;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn open(window_id: u8, kind: u8) -> ContainerOpen {
        ContainerOpen {
            window_id,
            container_type: kind,
            position: BlockPos::new(1, 2, 3),
            entity_unique_id: -1,
        }
    }

    fn close(window_id: u8, server_initiated: bool) -> ContainerClose {
        ContainerClose {
            window_id,
            server_initiated,
        }
    }

    #[test]
    fn starts_never_opened() {
        let tracker = ContainerTracker::new();
        assert_eq!(tracker.state(), ContainerState::NeverOpened);
        assert_eq!(tracker.container_data(), (None, false));
        assert!(tracker.closed_data().is_none());
    }

    #[test]
    fn open_close_reopen() {
        let tracker = ContainerTracker::new();
        tracker.handle_open(&open(2, container_type::ANVIL));
        let (desc, is_open) = tracker.container_data();
        assert!(is_open);
        assert_eq!(desc.unwrap().container_type, container_type::ANVIL);

        tracker.handle_close(&close(2, true));
        assert_eq!(tracker.container_data(), (None, false));
        assert!(tracker.closed_data().unwrap().server_initiated);

        tracker.handle_open(&open(3, container_type::LOOM));
        assert!(tracker.closed_data().is_none());
        assert_eq!(tracker.container_data().0.unwrap().window_id, 3);
    }

    #[test]
    fn hooks_fire_exactly_once() {
        let tracker = ContainerTracker::new();
        let opens = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));

        let o = opens.clone();
        tracker.on_open(move |desc| {
            assert_eq!(desc.window_id, 5);
            o.fetch_add(1, Ordering::SeqCst);
        });
        let c = closes.clone();
        tracker.on_close(move |closed| {
            assert!(!closed.server_initiated);
            c.fetch_add(1, Ordering::SeqCst);
        });

        tracker.handle_open(&open(5, container_type::CONTAINER));
        tracker.handle_open(&open(5, container_type::CONTAINER));
        tracker.handle_close(&close(5, false));
        tracker.handle_close(&close(5, false));

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_may_reregister_itself() {
        let tracker = Arc::new(ContainerTracker::new());
        let t = tracker.clone();
        tracker.on_open(move |_| t.on_open(|_| {}));
        tracker.handle_open(&open(1, container_type::CONTAINER));
    }
}
