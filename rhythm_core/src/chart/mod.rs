use beatmap_schema::Beatmap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Perfect,
    Great,
    Miss,
}

impl Outcome {
    /// Accuracy weight: Perfect 1.0, Great 0.8, Miss 0.0.
    pub fn weight(&self) -> f64 {
        match self {
            Outcome::Perfect => 1.0,
            Outcome::Great => 0.8,
            Outcome::Miss => 0.0,
        }
    }

    pub fn breaks_combo(&self) -> bool {
        matches!(self, Outcome::Miss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartEvent {
    /// Seconds from song start.
    pub target_time: f64,
    pub lane: usize,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("lane count must be at least 1")]
    ZeroLanes,
    #[error("event {index}: lane {lane} out of range (lane count {lane_count})")]
    LaneOutOfRange {
        index: usize,
        lane: usize,
        lane_count: usize,
    },
    #[error("event {index}: invalid target time {time}")]
    InvalidTime { index: usize, time: f64 },
}

/// Time-ordered, immutable sequence of hit events for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    events: Vec<ChartEvent>,
    lane_count: usize,
}

impl Chart {
    /// Builds a chart from `(time_seconds, lane)` pairs.
    ///
    /// Events are sorted ascending by time; ties keep their input order.
    pub fn load(
        raw: impl IntoIterator<Item = (f64, usize)>,
        lane_count: usize,
    ) -> Result<Self, ChartError> {
        if lane_count == 0 {
            return Err(ChartError::ZeroLanes);
        }

        let mut events = Vec::new();
        for (index, (time, lane)) in raw.into_iter().enumerate() {
            if !time.is_finite() || time < 0.0 {
                return Err(ChartError::InvalidTime { index, time });
            }
            if lane >= lane_count {
                return Err(ChartError::LaneOutOfRange {
                    index,
                    lane,
                    lane_count,
                });
            }
            events.push(ChartEvent {
                target_time: time,
                lane,
            });
        }

        // `sort_by` is stable, which keeps file order for simultaneous events.
        events.sort_by(|a, b| a.target_time.total_cmp(&b.target_time));

        Ok(Self { events, lane_count })
    }

    pub fn from_beatmap(beatmap: &Beatmap) -> Result<Self, ChartError> {
        Self::load(
            beatmap.hit_objects.iter().map(|h| (h.time, h.lane)),
            beatmap.lane_count,
        )
    }

    pub fn events(&self) -> &[ChartEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&ChartEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn last_target_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.target_time)
    }
}
