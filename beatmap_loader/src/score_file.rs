//! Plain-text high score file:
//!
//! ```text
//! [Score]
//! Score: 123456
//! Accuracy: 100.00
//! Rank: SSS
//! ```

use std::{collections::HashMap, fs, path::Path};

use beatmap_schema::{Rank, ScoreRecord};
use tracing::debug;

use crate::LoadError;

/// Contents of a freshly reset score file. `X` marks a chart that has not been played.
pub const EMPTY_SCORE: &str = "[Score]\nScore: 0\nAccuracy: 00.00\nRank: X";

pub fn format_score(record: &ScoreRecord) -> String {
    format!(
        "[Score]\nScore: {}\nAccuracy: {:.2}\nRank: {}",
        record.score, record.accuracy, record.rank
    )
}

pub fn parse_score_str(src: &str) -> Result<ScoreRecord, LoadError> {
    let fields = score_fields(src);

    let field = |key: &str| {
        fields
            .get(key)
            .map(|(value, line)| (value.as_str(), *line))
            .ok_or_else(|| LoadError::new("E1011", format!("missing {key} in [Score]"), 0))
    };

    let (raw_score, line) = field("Score")?;
    let score: u64 = raw_score
        .parse()
        .map_err(|_| LoadError::new("E1012", format!("invalid score: {raw_score:?}"), line))?;

    let (raw_accuracy, line) = field("Accuracy")?;
    let accuracy: f64 = raw_accuracy
        .parse()
        .map_err(|_| LoadError::new("E1012", format!("invalid accuracy: {raw_accuracy:?}"), line))?;

    let (raw_rank, line) = field("Rank")?;
    let rank = if raw_rank == "X" {
        Rank::from_accuracy(accuracy)
    } else {
        raw_rank
            .parse::<Rank>()
            .map_err(|e| LoadError::new("E1013", e, line))?
    };

    Ok(ScoreRecord {
        score,
        accuracy,
        rank,
        max_combo: 0,
        counts: Default::default(),
    })
}

pub fn read_score_file(path: impl AsRef<Path>) -> Result<ScoreRecord, LoadError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|e| {
        LoadError::new("E2001", format!("failed to read score file: {e}"), 0)
            .with_file(path.display().to_string())
    })?;
    parse_score_str(&src).map_err(|e| e.with_file(path.display().to_string()))
}

/// Previous best score, 0 when the file does not exist yet.
pub fn read_high_score(path: impl AsRef<Path>) -> Result<u64, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no score file yet");
        return Ok(0);
    }
    Ok(read_score_file(path)?.score)
}

pub fn write_score_file(path: impl AsRef<Path>, record: &ScoreRecord) -> Result<(), LoadError> {
    write_raw(path.as_ref(), &format_score(record))
}

pub fn reset_score_file(path: impl AsRef<Path>) -> Result<(), LoadError> {
    write_raw(path.as_ref(), EMPTY_SCORE)
}

fn write_raw(path: &Path, contents: &str) -> Result<(), LoadError> {
    fs::write(path, contents).map_err(|e| {
        LoadError::new("E2002", format!("failed to write score file: {e}"), 0)
            .with_file(path.display().to_string())
    })
}

/// `Key: value` pairs of the `[Score]` section, with their line numbers.
fn score_fields(src: &str) -> HashMap<String, (String, usize)> {
    let mut fields = HashMap::new();
    let mut in_score = false;

    for (i, raw_line) in src.lines().enumerate() {
        let line = raw_line.trim();
        if line == "[Score]" {
            in_score = true;
            continue;
        }
        if line.starts_with('[') && in_score {
            break;
        }
        if !in_score {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                fields.insert(key.to_string(), (value.trim().to_string(), i + 1));
            }
        }
    }
    fields
}
