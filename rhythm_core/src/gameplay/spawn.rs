use tracing::debug;

use crate::chart::Chart;
use crate::gameplay::judge::{ActiveEvent, ActiveSet};

/// Walks the chart in time order and promotes events to active `lead_time` seconds
/// before their target time.
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    next_index: usize,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn is_exhausted(&self, chart: &Chart) -> bool {
        self.next_index >= chart.len()
    }

    /// Promotes every due event and returns the newly spawned ones, in chart order.
    pub fn tick(
        &mut self,
        chart: &Chart,
        position: f64,
        lead_time: f64,
        active: &mut ActiveSet,
    ) -> Vec<ActiveEvent> {
        let mut spawned = Vec::new();

        while let Some(event) = chart.get(self.next_index) {
            if position < event.target_time - lead_time {
                break;
            }
            let active_event = ActiveEvent::new(self.next_index, event, position);
            if active.insert(active_event) {
                spawned.push(active_event);
            }
            self.next_index += 1;
        }

        if !spawned.is_empty() {
            debug!(count = spawned.len(), position, "spawned events");
        }
        spawned
    }

    /// Returns the indices that were never spawned and marks them consumed.
    pub fn take_remaining(&mut self, chart: &Chart) -> std::ops::Range<usize> {
        let remaining = self.next_index..chart.len().max(self.next_index);
        self.next_index = chart.len().max(self.next_index);
        remaining
    }
}
