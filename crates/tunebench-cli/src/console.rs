use tunebench_contracts::results::{GeneratedTrack, GenerationResult, NOT_AVAILABLE};
use tunebench_engine::local::LocalGeneration;

const RULE_WIDTH: usize = 60;
const STATUS_ERROR_CHARS: usize = 60;

pub fn format_tracks(tracks: &[GeneratedTrack]) -> String {
    if tracks.is_empty() {
        return "No tracks found in response.\n".to_string();
    }
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        format!("    Generated {} track(s)", tracks.len()),
        rule,
        String::new(),
    ];
    for (idx, track) in tracks.iter().enumerate() {
        let duration = track
            .duration_s
            .map(|value| format!("{value}s"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        lines.extend([
            format!(
                "  Track {}: {}",
                idx + 1,
                track.title.as_deref().unwrap_or("Untitled")
            ),
            format!("  ├── Style/Tags : {}", or_na(&track.tags)),
            format!("  ├── Duration   : {duration}"),
            format!("  ├── Model      : {}", or_na(&track.model_name)),
            format!("  ├── Created    : {}", or_na(&track.created_at)),
            format!("  ├── Audio URL  : {}", or_na(&track.audio_url)),
            format!("  ├── Stream URL : {}", or_na(&track.stream_url)),
            format!("  └── Image URL  : {}", or_na(&track.image_url)),
            String::new(),
        ]);
    }
    join_lines(&lines)
}

pub fn format_local(generation: &LocalGeneration) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let lines = [
        String::new(),
        rule.clone(),
        "  Generated Track (Local)".to_string(),
        rule,
        format!("  ├── Prompt       : {}", preview(&generation.prompt, 70)),
        format!("  ├── Model        : {}", generation.model),
        format!("  ├── Device       : {}", generation.device),
        format!(
            "  ├── Duration     : {}s (requested {}s)",
            generation.duration_actual_s, generation.duration_requested_s
        ),
        format!("  ├── File         : {}", generation.output_file.display()),
        format!(
            "  ├── File Size    : {:.1} KB",
            generation.file_size_bytes as f64 / 1024.0
        ),
        format!("  ├── Gen Time     : {}s", generation.generation_time_s),
        format!("  └── Created      : {}", generation.created_at),
    ];
    join_lines(&lines)
}

/// `OK | tracks=2 | time=12.3s` or `FAILED: <first 60 chars of error>`.
pub fn format_status_line(result: &GenerationResult) -> String {
    let status = match &result.error {
        None => "OK".to_string(),
        Some(error) => format!("FAILED: {}", error.chars().take(STATUS_ERROR_CHARS).collect::<String>()),
    };
    format!(
        "[{}] {status} | tracks={} | time={}",
        result.backend,
        result.tracks_generated,
        format_time(result.total_time_s)
    )
}

pub fn format_summary(results: &[GenerationResult]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "  SUMMARY".to_string(),
        rule,
        format!(
            "  {:<25} {:<18} {:<10} {:<8} {:>8}",
            "Prompt", "Backend", "Status", "Tracks", "Time"
        ),
        format!(
            "  {} {} {} {} {}",
            "─".repeat(25),
            "─".repeat(18),
            "─".repeat(10),
            "─".repeat(8),
            "─".repeat(8)
        ),
    ];
    lines.extend(results.iter().map(|result| {
        let status = if result.is_ok() { "OK" } else { "FAILED" };
        format!(
            "  {:<25} {:<18} {:<10} {:<8} {:>8}",
            result.prompt_name,
            result.backend,
            status,
            result.tracks_generated,
            format_time(result.total_time_s)
        )
    }));
    join_lines(&lines)
}

/// Newline-terminated, one entry per line.
fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_time(seconds: Option<f64>) -> String {
    seconds
        .map(|value| format!("{value}s"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect::<String>() + "..."
}
