use tunebench_contracts::models::{LimitedField, ModelRegistry, NON_CUSTOM_PROMPT_LIMIT};

use super::error::ValidationError;
use super::request::GenerationRequest;

/// Checks required fields and character limits for the request's mode and model.
///
/// Pure; must pass before anything is sent.
pub fn validate_request(
    request: &GenerationRequest,
    models: &ModelRegistry,
) -> Result<(), ValidationError> {
    let Some(spec) = models.get(&request.model) else {
        return Err(ValidationError::UnknownModel {
            model: request.model.clone(),
            known: models.names(),
        });
    };

    if !request.custom_mode {
        require(Some(&request.prompt), LimitedField::Prompt, "non-custom mode")?;
        return check_limit(
            &request.prompt,
            NON_CUSTOM_PROMPT_LIMIT,
            LimitedField::Prompt,
            "non-custom mode",
        );
    }

    require(request.style.as_ref(), LimitedField::Style, "customMode is true")?;
    require(request.title.as_ref(), LimitedField::Title, "customMode is true")?;
    if !request.instrumental {
        require(
            Some(&request.prompt),
            LimitedField::Prompt,
            "customMode is true and instrumental is false",
        )?;
    }

    let fields = [
        (LimitedField::Prompt, Some(request.prompt.as_str())),
        (LimitedField::Style, request.style.as_deref()),
        (LimitedField::Title, request.title.as_deref()),
    ];
    for (field, value) in fields {
        match value {
            Some(value) if !value.is_empty() => {
                check_limit(value, spec.limit(field), field, &spec.name)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn require(
    value: Option<&String>,
    field: LimitedField,
    context: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField { field, context }),
    }
}

fn check_limit(
    value: &str,
    limit: usize,
    field: LimitedField,
    context: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > limit {
        return Err(ValidationError::TooLong {
            field,
            context: context.to_string(),
            len,
            limit,
        });
    }
    Ok(())
}
