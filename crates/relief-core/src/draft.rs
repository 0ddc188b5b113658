//! Event draft buffer: events staged for the next round.
//!
//! Events enter only through [`EventDraftBuffer::stage`], which runs catalog
//! validation first, and leave only through [`EventDraftBuffer::drain`] or an
//! explicit [`EventDraftBuffer::discard`]. Insertion order is preserved
//! because the engine applies events sequentially.

use std::collections::BTreeMap;

use relief_types::StagedEvent;

use crate::catalog::EventCatalog;
use crate::error::SimulationError;

/// Ordered buffer of validated events awaiting submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraftBuffer {
    events: Vec<StagedEvent>,
}

impl EventDraftBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Validate and append an event.
    ///
    /// The buffer is unchanged when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEventKind`] or
    /// [`SimulationError::MissingParameter`].
    pub fn stage(
        &mut self,
        kind: &str,
        params: BTreeMap<String, String>,
    ) -> Result<StagedEvent, SimulationError> {
        let descriptor = EventCatalog::describe(kind)?;
        EventCatalog::validate(descriptor.kind, &params)?;

        let event = StagedEvent {
            event_type: descriptor.kind,
            params,
        };
        self.events.push(event.clone());
        Ok(event)
    }

    /// Read-only view of the staged events, in staging order.
    pub fn peek(&self) -> &[StagedEvent] {
        &self.events
    }

    /// Take every staged event and leave the buffer empty.
    pub fn drain(&mut self) -> Vec<StagedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove the staged event at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::StagedEventNotFound`] if `index` is out of range.
    pub fn discard(&mut self, index: usize) -> Result<StagedEvent, SimulationError> {
        if index >= self.events.len() {
            return Err(SimulationError::StagedEventNotFound {
                index,
                staged: self.events.len(),
            });
        }
        Ok(self.events.remove(index))
    }

    /// Put a previously drained batch back in front of anything staged since.
    pub fn restore(&mut self, mut drained: Vec<StagedEvent>) {
        if drained.is_empty() {
            return;
        }
        drained.append(&mut self.events);
        self.events = drained;
    }

    /// Number of staged events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
