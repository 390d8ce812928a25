use std::fmt::Write as _;

use beatmap_schema::Beatmap;

use crate::LoadError;

/// Serializes a beatmap into the sectioned text format read by [`crate::parse_beatmap_str`].
///
/// Hit objects are written one per line, times rounded to whole milliseconds.
pub fn write_beatmap_str(beatmap: &Beatmap) -> Result<String, LoadError> {
    let bpm = beatmap.meta.bpm;
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(LoadError::new("E4001", format!("bpm must be positive, got {bpm}"), 0));
    }

    let mut out = String::new();
    let unknown = "Unknown";
    // Writing into a String cannot fail.
    let _ = writeln!(out, "[Metadata]");
    let _ = writeln!(out, "Artist: {}", beatmap.meta.artist.as_deref().unwrap_or(unknown));
    let _ = writeln!(out, "Song: {}", beatmap.meta.title.as_deref().unwrap_or(unknown));
    let _ = writeln!(out);

    let _ = writeln!(out, "[TimingPoints]");
    let _ = writeln!(
        out,
        "{},{:.6}",
        to_ms(beatmap.meta.timing_point_time),
        60000.0 / bpm
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "[HitObjects]");
    for (index, hit) in beatmap.hit_objects.iter().enumerate() {
        if hit.lane >= beatmap.lane_count {
            return Err(LoadError::new(
                "E4003",
                format!(
                    "hit object {index} in lane {} but beatmap has {} lanes",
                    hit.lane, beatmap.lane_count
                ),
                0,
            )
            .with_lane(hit.lane));
        }
        let pattern: Vec<&str> = (0..beatmap.lane_count)
            .map(|lane| if lane == hit.lane { "O" } else { "_" })
            .collect();
        let _ = writeln!(out, "{},{}", to_ms(hit.time), pattern.join(" "));
    }

    Ok(out)
}

fn to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}
