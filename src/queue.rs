//! [`ResponseSlotQueue`]: the ordered rendezvous structure (§4.1).
//!
//! One slot per request. Workers may `put` in any order; `get(k)` only
//! ever waits on slot `k`'s own readiness signal, which is what decouples
//! nondeterministic completion order from the deterministic delivery
//! order the dispatcher promises. The per-slot signal is a
//! `tokio::sync::Notify`, one per index, rather than a single shared
//! condition variable.

use std::sync::Mutex;

use tokio::sync::Notify;

use crate::response::ResponseRecord;

/// Errors a misuse of [`ResponseSlotQueue`] would raise (§4.1). Both
/// variants indicate a bug in the dispatcher, never a condition a caller
/// of the public API can trigger, so they `panic!` rather than returning
/// a `Result` — callers of `put`/`get` are internal to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot {0} was already put")]
    DoublePut(usize),
    #[error("slot {0} was already drained")]
    SlotDrained(usize),
}

enum SlotState {
    Empty,
    Ready(ResponseRecord),
    Drained,
}

struct Slot {
    state: Mutex<SlotState>,
    notify: Notify,
}

/// A fixed-capacity array of slots, one per request index.
pub struct ResponseSlotQueue {
    slots: Vec<Slot>,
}

impl ResponseSlotQueue {
    /// Create a queue with `len` empty slots.
    pub fn new(len: usize) -> Self {
        let slots = (0..len)
            .map(|_| Slot {
                state: Mutex::new(SlotState::Empty),
                notify: Notify::new(),
            })
            .collect();
        Self { slots }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Store `response` at `index` and wake anyone waiting on it. Exactly
    /// once per index (§4.1).
    pub fn put(&self, index: usize, response: ResponseRecord) -> Result<(), SlotError> {
        let slot = &self.slots[index];
        {
            let mut state = slot.state.lock().unwrap_or_else(|e| e.into_inner());
            match *state {
                SlotState::Empty => *state = SlotState::Ready(response),
                SlotState::Ready(_) | SlotState::Drained => {
                    return Err(SlotError::DoublePut(index));
                }
            }
        }
        slot.notify.notify_waiters();
        Ok(())
    }

    /// Block until `put(index, ..)` has occurred, then return the
    /// response. Slots are single-consumption: a second `get(index)` fails
    /// with [`SlotError::SlotDrained`] (§4.1).
    pub async fn get(&self, index: usize) -> Result<ResponseRecord, SlotError> {
        let slot = &self.slots[index];
        loop {
            {
                let mut state = slot.state.lock().unwrap_or_else(|e| e.into_inner());
                match &*state {
                    SlotState::Ready(_) => {
                        let SlotState::Ready(response) =
                            std::mem::replace(&mut *state, SlotState::Drained)
                        else {
                            unreachable!()
                        };
                        return Ok(response);
                    }
                    SlotState::Drained => return Err(SlotError::SlotDrained(index)),
                    SlotState::Empty => {}
                }
            }
            // Register for notification before re-checking to avoid missing a
            // wakeup that lands between the check above and the wait below.
            let notified = slot.notify.notified();
            // Re-check after subscribing: `put` may have landed concurrently.
            {
                let state = slot.state.lock().unwrap_or_else(|e| e.into_inner());
                if matches!(&*state, SlotState::Empty) {
                    drop(state);
                    notified.await;
                }
            }
        }
    }

    /// `true` iff no slot currently holds a put-but-not-yet-got response
    /// (§4.1).
    pub fn empty(&self) -> bool {
        self.slots.iter().all(|slot| {
            !matches!(
                *slot.state.lock().unwrap_or_else(|e| e.into_inner()),
                SlotState::Ready(_)
            )
        })
    }
}
