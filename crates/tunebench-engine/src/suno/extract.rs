use serde_json::Value;
use tunebench_contracts::results::GeneratedTrack;

/// Normalises the tracks in a terminal `SUCCESS` payload (`data` object).
///
/// A payload without `response.sunoData` yields no tracks.
pub fn extract_tracks(data: &Value) -> Vec<GeneratedTrack> {
    let Some(rows) = data
        .get("response")
        .and_then(|response| response.get("sunoData"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    rows.iter()
        .filter(|row| row.is_object())
        .map(|row| GeneratedTrack {
            title: text_field(row, "title"),
            tags: text_field(row, "tags"),
            duration_s: number_field(row, "duration"),
            model_name: text_field(row, "modelName"),
            audio_url: text_field(row, "audioUrl"),
            stream_url: text_field(row, "streamAudioUrl"),
            image_url: text_field(row, "imageUrl"),
            created_at: text_field(row, "createTime"),
        })
        .collect()
}

fn text_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number_field(row: &Value, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
