use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use beatmap_loader::score_file;
use beatmap_schema::ScoreRecord;
use rhythm_core::{
    audio::{DspClock, SimulatedPlayback},
    chart::Chart,
    config::GameConfig,
    gameplay::{JudgeCause, Judgement},
    input::{
        events::{InputEvent, KeyPress},
        InputQueue,
    },
    session::{EndReason, ScoreStore, Session, SessionEvent, SessionState},
};
use tracing::{info, warn};

/// Silence after the last note when no clip duration is given.
const DEFAULT_TAIL: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub beatmap: PathBuf,
    pub inputs: PathBuf,
    pub config: Option<PathBuf>,
    pub score_file: Option<PathBuf>,
    pub tick_hz: u32,
    pub high_score: Option<u64>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScriptTarget {
    Lane(usize),
    Key(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScriptLine {
    time: f64,
    target: ScriptTarget,
}

/// Saves beaten high scores to a score file.
struct FileScoreStore {
    path: PathBuf,
}

impl ScoreStore for FileScoreStore {
    fn save(&mut self, record: &ScoreRecord) -> anyhow::Result<()> {
        score_file::write_score_file(&self.path, record)?;
        info!(path = %self.path.display(), score = record.score, "score file written");
        Ok(())
    }
}

pub fn run_replay(options: &ReplayOptions) -> anyhow::Result<()> {
    if options.tick_hz == 0 {
        bail!("--tick-hz must be at least 1");
    }

    let beatmap = beatmap_loader::load_beatmap(&options.beatmap)
        .with_context(|| format!("replay failed: {}", options.beatmap.display()))?;
    let config = match &options.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let chart = Chart::from_beatmap(&beatmap).context("invalid beatmap")?;
    let script = load_script(&options.inputs)?;

    let duration = match options.duration {
        Some(d) if d.is_finite() && d > 0.0 => d,
        Some(d) => bail!("--duration must be positive, got {d}"),
        None => chart.last_target_time().unwrap_or(0.0).max(0.0) + DEFAULT_TAIL,
    };

    let high_score = match (options.high_score, &options.score_file) {
        (Some(score), _) => score,
        (None, Some(path)) => score_file::read_high_score(path)?,
        (None, None) => 0,
    };

    let clock = DspClock::new();
    let audio = SimulatedPlayback::with_clip(clock.clone(), duration);
    let mut session = Session::new(config, chart, audio)?.with_high_score(high_score);
    if let Some(path) = &options.score_file {
        session = session.with_store(FileScoreStore { path: path.clone() });
    }

    info!(
        notes = session.chart().len(),
        duration,
        tick_hz = options.tick_hz,
        high_score,
        "replay start"
    );

    println!("Note(s)  | Lane | Outcome | Error(ms) | Cause");
    println!("---------|------|---------|-----------|--------");

    let queue = InputQueue::new();
    let mut pending = script.into_iter().peekable();
    let tick = 1.0 / f64::from(options.tick_hz);
    // Room past the clip end for the completion check to fire.
    let max_steps = ((duration + 1.0) * f64::from(options.tick_hz)).ceil() as u64;

    session.start();
    let mut ended = None;
    for step in 0..=max_steps {
        clock.set(step as f64 * tick);

        // Presses up to this step's position are judged before its expiry pass.
        if session.state() == SessionState::Playing {
            let position = session.clock().position_at(clock.now());
            while let Some(line) = pending.next_if(|line| line.time <= position) {
                queue_line(&session, &queue, &line);
            }
            for judgement in session.drain_input(&queue) {
                print_judgement(session.chart(), &judgement);
            }
        }

        for event in session.tick() {
            match event {
                SessionEvent::Judged(judgement) => print_judgement(session.chart(), &judgement),
                SessionEvent::Ended {
                    reason,
                    record,
                    new_high_score,
                } => ended = Some((reason, record, new_high_score)),
                SessionEvent::Started | SessionEvent::Spawned(_) => {}
            }
        }
        if ended.is_some() {
            break;
        }
    }

    let Some((reason, record, new_high_score)) = ended else {
        bail!("replay did not finish within {max_steps} ticks");
    };

    println!();
    println!("Result:    {}", end_label(reason));
    println!("Score:     {}", record.score);
    println!("Accuracy:  {:.2}", record.accuracy);
    println!("Rank:      {}", record.rank);
    println!("Max combo: {}", record.max_combo);
    println!(
        "Perfect {} / Great {} / Miss {}",
        record.counts.perfect, record.counts.great, record.counts.miss
    );
    if new_high_score {
        println!("New high score! (previous {high_score})");
    }

    Ok(())
}

fn queue_line(session: &Session<SimulatedPlayback>, queue: &InputQueue, line: &ScriptLine) {
    let press = match line.target {
        ScriptTarget::Lane(lane) => Some(KeyPress {
            lane,
            time: line.time,
        }),
        ScriptTarget::Key(key) => session.config().key_bindings.translate(&InputEvent {
            timestamp: line.time,
            key,
            pressed: true,
        }),
    };
    match press {
        Some(press) if press.lane < session.chart().lane_count() => queue.push(press),
        Some(press) => warn!(
            lane = press.lane,
            time = press.time,
            "input on unknown lane dropped"
        ),
        None => warn!(time = line.time, target = ?line.target, "unbound key dropped"),
    }
}

fn print_judgement(chart: &Chart, judgement: &Judgement) {
    let target = chart.get(judgement.index).map_or(0.0, |e| e.target_time);
    let cause = match judgement.cause {
        JudgeCause::Hit => "hit",
        JudgeCause::Expired => "expired",
    };
    println!(
        "{:8.3} | {:4} | {:7} | {:+9.1} | {}",
        target,
        judgement.lane,
        format!("{:?}", judgement.outcome),
        judgement.error * 1000.0,
        cause
    );
}

fn end_label(reason: EndReason) -> &'static str {
    match reason {
        EndReason::Completed => "completed",
        EndReason::Failed => "failed",
    }
}

fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptLine>> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("failed to read input script: {}", path.display()))?;
    parse_script(&src).with_context(|| format!("invalid input script: {}", path.display()))
}

/// `<seconds> <lane>` or `<seconds> <key>` per line; `#` starts a comment.
fn parse_script(src: &str) -> anyhow::Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(raw_time), Some(raw_target), None) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("line {line_no}: expected `<seconds> <lane or key>`, got {line:?}");
        };

        let time: f64 = raw_time
            .parse()
            .with_context(|| format!("line {line_no}: invalid time {raw_time:?}"))?;
        if !time.is_finite() {
            bail!("line {line_no}: time must be finite");
        }

        let target = if let Ok(lane) = raw_target.parse::<usize>() {
            ScriptTarget::Lane(lane)
        } else {
            let mut chars = raw_target.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => ScriptTarget::Key(key),
                _ => bail!("line {line_no}: invalid lane or key {raw_target:?}"),
            }
        };

        lines.push(ScriptLine { time, target });
    }

    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_script_lanes_keys_and_comments() {
        let src = "# warmup\n1.5 2\n0.5 a  # first\n\n1.0 ;\n";
        let lines = parse_script(src).unwrap();
        assert_eq!(
            lines,
            vec![
                ScriptLine {
                    time: 0.5,
                    target: ScriptTarget::Key('a')
                },
                ScriptLine {
                    time: 1.0,
                    target: ScriptTarget::Key(';')
                },
                ScriptLine {
                    time: 1.5,
                    target: ScriptTarget::Lane(2)
                },
            ]
        );
    }

    #[test]
    fn parse_script_rejects_bad_lines() {
        assert!(parse_script("1.0\n").is_err());
        assert!(parse_script("soon 1\n").is_err());
        assert!(parse_script("1.0 ab\n").is_err());
        assert!(parse_script("1.0 1 2\n").is_err());
    }
}
