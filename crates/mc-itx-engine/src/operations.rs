//! Operation manager: request id allocation and response dispatch.
//!
//! Every request id put on the wire has an entry here holding its
//! role -> window mapping, the per-slot predictions and the completion
//! callback. An entry is removed the moment its response is consumed, so a
//! response is delivered at most once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

use mc_itx_proto::packets::{ItemStackResponse, StackResponseEntry};
use mc_itx_proto::{ContainerId, ItemStack};
use tokio::runtime::Handle;
use tracing::{debug, error, trace, warn};

use crate::error::EngineError;
use crate::mirror::{ResourceMirror, SlotLocation, WindowId};
use crate::reconcile::{reconcile, PredictedSlot};

/// Role -> window translation for one request.
pub type ResponseMapping = HashMap<ContainerId, WindowId>;

/// Completion callback, run once the response arrives: on its own task
/// when a Tokio runtime is available, inline otherwise.
pub type Completion = Box<dyn FnOnce(StackResponseEntry) + Send>;

/// First request id handed out. Ids then step down by two.
const FIRST_REQUEST_ID: i32 = -1;

struct PendingRequest {
    mapping: ResponseMapping,
    predictions: HashMap<SlotLocation, PredictedSlot>,
    on_complete: Completion,
}

pub struct OperationManager {
    next_id: AtomicI32,
    pending: Mutex<HashMap<i32, PendingRequest>>,
}

impl Default for OperationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationManager {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(FIRST_REQUEST_ID),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a fresh request id: -1, -3, -5, ...
    pub fn new_request_id(&self) -> i32 {
        self.next_id.fetch_sub(2, Ordering::SeqCst)
    }

    /// Register bookkeeping for `request_id`. Must happen before the request is sent.
    pub fn add_new_request(
        &self,
        request_id: i32,
        mapping: ResponseMapping,
        predictions: HashMap<SlotLocation, PredictedSlot>,
        on_complete: Completion,
    ) {
        let mut pending = self.lock();
        if pending
            .insert(
                request_id,
                PendingRequest {
                    mapping,
                    predictions,
                    on_complete,
                },
            )
            .is_some()
        {
            warn!("Request {request_id} registered twice, previous callback dropped");
        }
    }

    /// Forget a request that never reached the server. Its callback is dropped.
    pub fn cancel(&self, request_id: i32) -> bool {
        self.lock().remove(&request_id).is_some()
    }

    /// Number of requests waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_pending(&self, request_id: i32) -> bool {
        self.lock().contains_key(&request_id)
    }

    /// Route a response batch to the registered requests.
    ///
    /// Every known entry is applied and completed even when the batch also
    /// names unknown ids; those are reported together as
    /// [`EngineError::Desynchronized`] afterwards. Inside a Tokio runtime
    /// completions are spawned onto it; elsewhere they run before this
    /// returns.
    pub fn handle_response(
        &self,
        response: &ItemStackResponse,
        mirror: &ResourceMirror,
    ) -> Result<(), EngineError> {
        let mut unknown = Vec::new();

        for entry in &response.responses {
            let Some(pending) = self.lock().remove(&entry.request_id) else {
                error!(
                    "Response for unregistered request {} (status {})",
                    entry.request_id, entry.status
                );
                unknown.push(entry.request_id);
                continue;
            };

            if entry.is_success() {
                apply_entry(entry, &pending.mapping, &pending.predictions, mirror);
                debug!("Request {} accepted", entry.request_id);
            } else {
                debug!(
                    "Request {} rejected with status {}",
                    entry.request_id, entry.status
                );
            }

            complete(pending.on_complete, entry.clone());
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Desynchronized {
                request_ids: unknown,
            })
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i32, PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn complete(on_complete: Completion, entry: StackResponseEntry) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { on_complete(entry) });
        }
        Err(_) => on_complete(entry),
    }
}

fn apply_entry(
    entry: &StackResponseEntry,
    mapping: &ResponseMapping,
    predictions: &HashMap<SlotLocation, PredictedSlot>,
    mirror: &ResourceMirror,
) {
    for container in &entry.containers {
        let window = ContainerId::from_u8(container.container_id)
            .and_then(|role| mapping.get(&role).copied());
        let Some(window) = window else {
            warn!(
                "Request {}: no window for role {}, skipping {} slots",
                entry.request_id,
                container.container_id,
                container.slots.len()
            );
            continue;
        };

        for ack in &container.slots {
            let loc = SlotLocation::new(window, ack.slot);
            let predicted = predictions.get(&loc);
            let base = match predicted.and_then(|p| p.template.clone()) {
                Some(template) => template,
                None => mirror.get_item(loc).0.unwrap_or_else(ItemStack::empty),
            };
            let item = reconcile(base, ack, predicted.and_then(|p| p.expected.as_ref()));
            trace!(
                "Request {}: slot {loc} now count {} id {}",
                entry.request_id,
                item.count,
                item.stack_network_id
            );
            mirror.set_item(loc, Some(item));
        }
    }
}
