//! In-process event fan-out for basket transitions.
//!
//! Distinct from the persisted notification log: these events exist only
//! for observers inside the same process (UI refresh hooks, audit taps in
//! tests). Payloads are JSON strings of [`PetEvent`].

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;
use log::warn;
use serde::{Deserialize, Serialize};

/// Emitted after a successful, persisted reservation.
pub const PET_RESERVED: &str = "pet.reserved";
/// Emitted after a successful, persisted release.
pub const PET_RELEASED: &str = "pet.released";
/// Emitted after a successful adoption (user record persisted).
pub const PET_ADOPTED: &str = "pet.adopted";

/// Payload for all basket transition events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetEvent {
    pub username: String,
    pub pet_id: u32,
    pub pet_name: String,
}

/// Wraps an [`EventEmitter`] behind a lock so emitters only need `&self`.
pub struct EngineEvents {
    emitter: Mutex<EventEmitter>,
}

impl Default for EngineEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineEvents {
    pub fn new() -> Self {
        EngineEvents {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for one of the `pet.*` events. The callback
    /// receives the JSON-encoded [`PetEvent`].
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.on(event, listener);
            }
            Err(_) => warn!("event emitter lock poisoned; listener for {} dropped", event),
        }
    }

    /// Fire-and-forget: emitting never fails the operation that triggered it.
    pub(crate) fn emit(&self, event: &str, payload: &PetEvent) {
        let data = match serde_json::to_string(payload) {
            Ok(data) => data,
            Err(err) => {
                warn!("could not encode {} payload: {}", event, err);
                return;
            }
        };
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.emit(event, data);
            }
            Err(_) => warn!("event emitter lock poisoned; {} not emitted", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn listeners_receive_emitted_payloads() {
        let events = EngineEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        events.on(PET_ADOPTED, move |data: String| {
            sink.lock().unwrap().push(data);
        });

        let payload = PetEvent {
            username: "alice".to_string(),
            pet_id: 1,
            pet_name: "Hoot".to_string(),
        };
        events.emit(PET_ADOPTED, &payload);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let decoded: PetEvent = serde_json::from_str(&seen[0]).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let events = EngineEvents::new();
        events.emit(
            PET_RESERVED,
            &PetEvent {
                username: "alice".to_string(),
                pet_id: 1,
                pet_name: "Hoot".to_string(),
            },
        );
    }
}
