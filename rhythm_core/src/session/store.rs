use std::sync::Arc;

use beatmap_schema::ScoreRecord;
use parking_lot::Mutex;

/// Persistence collaborator, invoked once at song end when the high score is beaten.
pub trait ScoreStore {
    fn save(&mut self, record: &ScoreRecord) -> anyhow::Result<()>;
}

/// In-memory store. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records.lock().clone()
    }

    pub fn best_score(&self) -> Option<u64> {
        self.records.lock().iter().map(|r| r.score).max()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save(&mut self, record: &ScoreRecord) -> anyhow::Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
