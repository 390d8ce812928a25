use serde::{Deserialize, Serialize};

pub mod score;

pub use score::{OutcomeCounts, Rank, ScoreRecord};

pub type Seconds = f64;

pub const DEFAULT_LANE_COUNT: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beatmap {
    pub meta: Metadata,
    #[serde(default = "default_lane_count")]
    pub lane_count: usize,
    pub hit_objects: Vec<HitObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub bpm: f64,
    /// Time of the first timing point. Informational; judgement uses hit object times only.
    #[serde(default)]
    pub timing_point_time: Seconds,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: None,
            artist: None,
            bpm: 120.0,
            timing_point_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HitObject {
    pub time: Seconds,
    pub lane: usize,
}

fn default_lane_count() -> usize {
    DEFAULT_LANE_COUNT
}

impl Beatmap {
    pub fn new(meta: Metadata, lane_count: usize, hit_objects: Vec<HitObject>) -> Self {
        Self {
            meta,
            lane_count,
            hit_objects,
        }
    }

    pub fn total_notes(&self) -> usize {
        self.hit_objects.len()
    }

    pub fn last_hit_time(&self) -> Option<Seconds> {
        self.hit_objects
            .iter()
            .map(|h| h.time)
            .fold(None, |acc: Option<Seconds>, t| Some(acc.map_or(t, |a| a.max(t))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_count_defaults_to_four_when_missing() {
        let json = r#"{
            "meta": { "bpm": 150.0 },
            "hit_objects": [ { "time": 1.0, "lane": 2 } ]
        }"#;

        let beatmap: Beatmap = serde_json::from_str(json).unwrap();
        assert_eq!(beatmap.lane_count, 4);
        assert_eq!(beatmap.meta.timing_point_time, 0.0);
        assert_eq!(beatmap.hit_objects[0].lane, 2);
    }

    #[test]
    fn last_hit_time_ignores_order() {
        let beatmap = Beatmap::new(
            Metadata::default(),
            4,
            vec![
                HitObject { time: 2.5, lane: 0 },
                HitObject { time: 0.5, lane: 1 },
            ],
        );
        assert_eq!(beatmap.total_notes(), 2);
        assert_eq!(beatmap.last_hit_time(), Some(2.5));
    }

    #[test]
    fn empty_beatmap_has_no_last_hit() {
        let beatmap = Beatmap::new(Metadata::default(), 4, vec![]);
        assert_eq!(beatmap.last_hit_time(), None);
    }
}
