use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter grade derived from final accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    SSS,
    SS,
    S,
    AA,
    A,
    B,
    C,
    D,
    F,
}

impl Rank {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 100.0 {
            Rank::SSS
        } else if accuracy >= 99.0 {
            Rank::SS
        } else if accuracy >= 97.0 {
            Rank::S
        } else if accuracy >= 95.0 {
            Rank::AA
        } else if accuracy >= 93.0 {
            Rank::A
        } else if accuracy >= 90.0 {
            Rank::B
        } else if accuracy >= 80.0 {
            Rank::C
        } else if accuracy >= 70.0 {
            Rank::D
        } else {
            Rank::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::SSS => "SSS",
            Rank::SS => "SS",
            Rank::S => "S",
            Rank::AA => "AA",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SSS" => Ok(Rank::SSS),
            "SS" => Ok(Rank::SS),
            "S" => Ok(Rank::S),
            "AA" => Ok(Rank::AA),
            "A" => Ok(Rank::A),
            "B" => Ok(Rank::B),
            "C" => Ok(Rank::C),
            "D" => Ok(Rank::D),
            "F" => Ok(Rank::F),
            other => Err(format!("unknown rank: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub perfect: u32,
    pub great: u32,
    pub miss: u32,
}

impl OutcomeCounts {
    pub fn judged(&self) -> u32 {
        self.perfect + self.great + self.miss
    }
}

/// Final result handed to the persistence collaborator at song end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u64,
    pub accuracy: f64,
    pub rank: Rank,
    #[serde(default)]
    pub max_combo: u32,
    #[serde(default)]
    pub counts: OutcomeCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_thresholds() {
        assert_eq!(Rank::from_accuracy(100.0), Rank::SSS);
        assert_eq!(Rank::from_accuracy(99.99), Rank::SS);
        assert_eq!(Rank::from_accuracy(99.0), Rank::SS);
        assert_eq!(Rank::from_accuracy(97.0), Rank::S);
        assert_eq!(Rank::from_accuracy(96.5), Rank::AA);
        assert_eq!(Rank::from_accuracy(93.0), Rank::A);
        assert_eq!(Rank::from_accuracy(90.0), Rank::B);
        assert_eq!(Rank::from_accuracy(85.0), Rank::C);
        assert_eq!(Rank::from_accuracy(70.0), Rank::D);
        assert_eq!(Rank::from_accuracy(69.99), Rank::F);
        assert_eq!(Rank::from_accuracy(0.0), Rank::F);
    }

    #[test]
    fn rank_round_trips_through_str() {
        for rank in [Rank::SSS, Rank::AA, Rank::F] {
            assert_eq!(rank.as_str().parse::<Rank>().unwrap(), rank);
        }
        assert!("X".parse::<Rank>().is_err());
    }

    #[test]
    fn score_record_defaults_optional_fields() {
        let json = r#"{ "score": 950000, "accuracy": 96.4, "rank": "AA" }"#;
        let record: ScoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.rank, Rank::AA);
        assert_eq!(record.max_combo, 0);
        assert_eq!(record.counts.judged(), 0);
    }
}
