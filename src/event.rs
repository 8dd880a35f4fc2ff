// src/event.rs
//
// Grain spawn records for visualization.

/// Capacity of the event log between host drains.
pub const MAX_GRAIN_EVENTS: usize = 64;

/// A visualization record of one spawned grain.
///
/// These events:
/// - are written on the audio thread at spawn time
/// - are plain copyable data
/// - are read and cleared by the host
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrainEvent {
    /// Start position normalized to the buffer length (0..1)
    pub norm_position: f32,
    /// Grain duration in seconds
    pub duration: f32,
    /// Final pan (-1..1)
    pub pan: f32,
}

/// Bounded, allocation-free event list.
///
/// Once full, further events are dropped until the host clears it.
#[derive(Debug, Clone)]
pub struct GrainEventLog {
    events: [GrainEvent; MAX_GRAIN_EVENTS],
    len: usize,
}

impl GrainEventLog {
    pub fn new() -> Self {
        Self {
            events: [GrainEvent::default(); MAX_GRAIN_EVENTS],
            len: 0,
        }
    }

    /// Append an event. Returns `false` if it was dropped.
    #[inline]
    pub fn push(&mut self, event: GrainEvent) -> bool {
        match self.events.get_mut(self.len) {
            Some(slot) => {
                *slot = event;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&GrainEvent> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[GrainEvent] {
        &self.events[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for GrainEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(i: usize) -> GrainEvent {
        GrainEvent {
            norm_position: i as f32 / 100.0,
            duration: 0.1,
            pan: 0.0,
        }
    }

    #[test]
    fn test_drops_when_full() {
        let mut log = GrainEventLog::new();
        for i in 0..MAX_GRAIN_EVENTS {
            assert!(log.push(event(i)));
        }
        assert_eq!(log.len(), MAX_GRAIN_EVENTS);
        assert!(!log.push(event(99)));
        assert_eq!(log.len(), MAX_GRAIN_EVENTS);
        // The dropped event did not overwrite anything
        assert_eq!(log.get(MAX_GRAIN_EVENTS - 1), Some(&event(MAX_GRAIN_EVENTS - 1)));
    }

    #[test]
    fn test_clear() {
        let mut log = GrainEventLog::new();
        log.push(event(1));
        log.clear();
        assert_eq!(log.len(), 0);
        assert_eq!(log.get(0), None);
        assert!(log.push(event(2)));
        assert_eq!(log.as_slice(), &[event(2)]);
    }
}
