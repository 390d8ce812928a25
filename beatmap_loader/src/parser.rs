use beatmap_schema::{Beatmap, HitObject, Metadata};
use tracing::debug;

use crate::{LoadError, LoadOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Metadata,
    TimingPoints,
    HitObjects,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "[Metadata]" => Self::Metadata,
            "[TimingPoints]" => Self::TimingPoints,
            "[HitObjects]" => Self::HitObjects,
            _ => Self::Other,
        }
    }
}

pub(crate) fn parse_beatmap(src: &str, options: &LoadOptions) -> Result<Beatmap, LoadError> {
    if options.lane_count == 0 {
        return Err(LoadError::new("E4003", "lane count must be at least 1", 0));
    }

    let mut meta = Metadata::default();
    let mut hit_objects = Vec::new();
    let mut section = Section::Other;
    let mut timing_point_seen = false;

    for (i, raw_line) in src.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') {
            section = Section::from_header(line);
            if section == Section::Other {
                debug!(line = line_no, header = line, "skipping unknown section");
            }
            continue;
        }

        match section {
            Section::Metadata => parse_metadata_line(&mut meta, line),
            Section::TimingPoints => {
                // Only the first timing point drives tempo.
                if timing_point_seen {
                    debug!(line = line_no, "ignoring additional timing point");
                    continue;
                }
                let (time, bpm) =
                    parse_timing_point(line, line_no).map_err(|e| e.with_context(line))?;
                meta.timing_point_time = time;
                meta.bpm = bpm;
                timing_point_seen = true;
            }
            Section::HitObjects => {
                parse_hit_object_line(line, line_no, options.lane_count, &mut hit_objects)
                    .map_err(|e| e.with_context(line))?;
            }
            Section::Other => {}
        }
    }

    hit_objects.sort_by(|a: &HitObject, b: &HitObject| a.time.total_cmp(&b.time));

    Ok(Beatmap::new(meta, options.lane_count, hit_objects))
}

fn parse_metadata_line(meta: &mut Metadata, line: &str) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    let value = value.trim().to_string();
    match key.trim() {
        "Song" | "Title" => meta.title = Some(value),
        "Artist" => meta.artist = Some(value),
        _ => {}
    }
}

/// `time_ms,beat_length_ms` -> (offset seconds, bpm).
fn parse_timing_point(line: &str, line_no: usize) -> Result<(f64, f64), LoadError> {
    let mut parts = line.split(',');
    let time_ms = parse_ms(parts.next(), "timing point time", "E1001", line_no)?;
    let beat_length = parts
        .next()
        .ok_or_else(|| LoadError::new("E1003", "timing point needs time,beat_length", line_no))
        .and_then(|raw| parse_ms(Some(raw), "beat length", "E1001", line_no))?;

    if beat_length <= 0.0 {
        return Err(LoadError::new(
            "E4001",
            format!("beat length must be positive, got {beat_length}"),
            line_no,
        ));
    }

    Ok((time_ms / 1000.0, 60000.0 / beat_length))
}

/// `time_ms,_ _ O _`: one token per lane, `O` marks a hit.
fn parse_hit_object_line(
    line: &str,
    line_no: usize,
    lane_count: usize,
    out: &mut Vec<HitObject>,
) -> Result<(), LoadError> {
    let (raw_time, lanes) = line
        .split_once(',')
        .ok_or_else(|| LoadError::new("E1003", "hit object needs time,lanes", line_no))?;
    let time_ms = parse_ms(Some(raw_time), "hit object time", "E1002", line_no)?;

    let tokens: Vec<&str> = lanes.split_whitespace().collect();
    if tokens.len() > lane_count {
        debug!(
            line = line_no,
            tokens = tokens.len(),
            lane_count,
            "ignoring lane tokens past the lane count"
        );
    }

    for (lane, token) in tokens.iter().take(lane_count).enumerate() {
        if *token == "O" {
            out.push(HitObject {
                time: time_ms / 1000.0,
                lane,
            });
        }
    }
    Ok(())
}

fn parse_ms(
    raw: Option<&str>,
    what: &str,
    code: &'static str,
    line_no: usize,
) -> Result<f64, LoadError> {
    let raw = raw.map(str::trim).unwrap_or("");
    let value: f64 = raw
        .parse()
        .map_err(|_| LoadError::new(code, format!("invalid {what}: {raw:?}"), line_no))?;
    if !value.is_finite() {
        return Err(LoadError::new(
            "E4002",
            format!("{what} must be finite, got {raw}"),
            line_no,
        ));
    }
    Ok(value)
}
