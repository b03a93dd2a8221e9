//! Recently queried stations, newest first

use std::collections::VecDeque;

use crate::models::StationId;

#[derive(Debug, Clone)]
pub struct StationHistory {
    entries: VecDeque<StationId>,
    capacity: usize,
}

impl StationHistory {
    /// Create a history pre-filled with `seed`, truncated to `capacity`
    pub fn new(capacity: usize, seed: Vec<StationId>) -> Self {
        let capacity = capacity.max(1);
        let mut history = Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        };
        for station in seed {
            if !history.contains(&station) && history.entries.len() < capacity {
                history.entries.push_back(station);
            }
        }
        history
    }

    /// Remember a successfully queried station.
    ///
    /// Stations already present keep their position; new ones go to the front
    /// and push the oldest entry out once the history is full.
    pub fn record(&mut self, station: &StationId) -> bool {
        if self.contains(station) {
            return false;
        }
        self.entries.push_front(station.clone());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn contains(&self, station: &StationId) -> bool {
        self.entries.iter().any(|s| s == station)
    }

    pub fn stations(&self) -> Vec<StationId> {
        self.entries.iter().cloned().collect()
    }
}
