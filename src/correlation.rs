//! Correlation of actions with their responses and event lists.
//!
//! The [`CorrelationTable`] tracks one entry per in-flight action id: the
//! pending callback and the response being aggregated for it. Resolution
//! comes in three shapes: an immediate response, a deferred response closed
//! later by a terminal event, or teardown failing everything still pending.
//! Whatever the shape, each callback fires exactly once.
//!
//! The table itself is synchronous and lock-free; the session controller
//! owns it behind a mutex and invokes the returned callbacks only after the
//! guard is released.

use std::{collections::HashMap, fmt};

use crate::{error::AmiError, event::Event, response::Response};

/// Callback invoked with the outcome of one action.
///
/// Receives `Ok` with the (possibly event-aggregating) response, or `Err`
/// when the session is torn down before a terminal signal arrives.
pub type ResponseCallback = Box<dyn FnOnce(Result<Response, AmiError>) + Send + 'static>;

struct Entry {
    callback: ResponseCallback,
    response: Response,
}

/// What became of an inbound event.
pub enum EventDisposition {
    /// Appended to a pending response; more events expected.
    Consumed,
    /// Terminal event: the completed response and its callback, to be
    /// invoked by the caller. The event itself is not re-emitted.
    Completed(ResponseCallback, Response),
    /// No matching correlation; surface as a standalone event.
    Standalone(Event),
}

/// Pending-action registry keyed by correlation id.
#[derive(Default)]
pub struct CorrelationTable {
    entries: HashMap<String, Entry>,
}

impl CorrelationTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a callback for `id`.
    ///
    /// The entry starts with an empty aggregation target that a deferred
    /// response later replaces. Registering an id twice silently overwrites;
    /// the monotonic id generator upstream guarantees uniqueness.
    pub fn register(&mut self, id: impl Into<String>, callback: ResponseCallback) {
        self.entries.insert(
            id.into(),
            Entry {
                callback,
                response: Response::empty(),
            },
        );
    }

    /// Remove a registration whose action could not be written.
    pub fn unregister(&mut self, id: &str) -> Option<ResponseCallback> {
        self.entries.remove(id).map(|entry| entry.callback)
    }

    /// Route an inbound response.
    ///
    /// A deferred response (events will follow) becomes the aggregation
    /// target for its id and nothing fires yet. An immediate response
    /// resolves its entry: the returned callback must be invoked with the
    /// returned response. Responses with no registered id are dropped.
    pub fn on_response(&mut self, response: Response) -> Option<(ResponseCallback, Response)> {
        let id = response.action_id()?.to_owned();

        if response.will_follow() {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.response = response;
            }
            return None;
        }

        self.entries
            .remove(&id)
            .map(|entry| (entry.callback, response))
    }

    /// Route an inbound event.
    ///
    /// Events carrying the id of a pending action are appended to its
    /// aggregating response; a terminal event completes the entry and hands
    /// back the callback. Anything else is standalone.
    pub fn on_event(&mut self, event: Event) -> EventDisposition {
        let id = match event.action_id() {
            Some(id) if self.entries.contains_key(id) => id.to_owned(),
            _ => return EventDisposition::Standalone(event),
        };

        if event.is_complete() {
            match self.entries.remove(&id) {
                Some(mut entry) => {
                    entry.response.push_event(event);
                    EventDisposition::Completed(entry.callback, entry.response)
                }
                None => EventDisposition::Standalone(event),
            }
        } else {
            match self.entries.get_mut(&id) {
                Some(entry) => {
                    entry.response.push_event(event);
                    EventDisposition::Consumed
                }
                None => EventDisposition::Standalone(event),
            }
        }
    }

    /// Remove every pending entry, returning the callbacks.
    ///
    /// Teardown must invoke each with a session-closed error; pending
    /// callers are failed explicitly, never silently dropped.
    pub fn drain(&mut self) -> Vec<ResponseCallback> {
        self.entries
            .drain()
            .map(|(_, entry)| entry.callback)
            .collect()
    }

    /// Number of in-flight correlations.
    #[must_use]
    pub fn pending(&self) -> usize { self.entries.len() }
}

impl fmt::Debug for CorrelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationTable")
            .field("pending", &self.entries.len())
            .finish_non_exhaustive()
    }
}
