use serde_json::{json, Map, Number, Value};

use super::request::{ExtendedParams, GenerationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalField {
    PersonaId,
    PersonaModel,
    NegativeTags,
    VocalGender,
    StyleWeight,
    WeirdnessConstraint,
    AudioWeight,
}

/// Every optional field the builder forwards, with its wire key.
pub const OPTIONAL_FIELDS: [(OptionalField, &str); 7] = [
    (OptionalField::PersonaId, "personaId"),
    (OptionalField::PersonaModel, "personaModel"),
    (OptionalField::NegativeTags, "negativeTags"),
    (OptionalField::VocalGender, "vocalGender"),
    (OptionalField::StyleWeight, "styleWeight"),
    (OptionalField::WeirdnessConstraint, "weirdnessConstraint"),
    (OptionalField::AudioWeight, "audioWeight"),
];

impl OptionalField {
    fn value(self, params: &ExtendedParams) -> Option<Value> {
        let text = |value: &Option<String>| value.clone().map(Value::String);
        // Non-finite weights have no JSON form and are dropped.
        let number = |value: Option<f64>| value.and_then(Number::from_f64).map(Value::Number);
        match self {
            Self::PersonaId => text(&params.persona_id),
            Self::PersonaModel => text(&params.persona_model),
            Self::NegativeTags => text(&params.negative_tags),
            Self::VocalGender => text(&params.vocal_gender),
            Self::StyleWeight => number(params.style_weight),
            Self::WeirdnessConstraint => number(params.weirdness_constraint),
            Self::AudioWeight => number(params.audio_weight),
        }
    }
}

/// Body for `POST /generate`. Assumes the request already passed validation.
pub fn build_payload(request: &GenerationRequest, callback_url: &str) -> Map<String, Value> {
    let mut payload = map_object(json!({
        "customMode": request.custom_mode,
        "instrumental": request.instrumental,
        "model": request.model,
        "prompt": request.prompt,
        "callBackUrl": callback_url,
    }));

    if request.custom_mode {
        payload.insert("style".to_string(), json!(request.style));
        payload.insert("title".to_string(), json!(request.title));
    }

    for (field, wire_key) in OPTIONAL_FIELDS {
        if let Some(value) = field.value(&request.extended) {
            payload.insert(wire_key.to_string(), value);
        }
    }

    payload
}

fn map_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
