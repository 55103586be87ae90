use crate::{MAX_FIELD_NAME_LEN, MAX_MODEL_NAME_LEN};

/// Ensure model names are non-empty, ASCII, and within the maximum length.
pub fn validate_model_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("model name is empty".to_string());
    }
    if name.len() > MAX_MODEL_NAME_LEN {
        return Err(format!(
            "model name '{name}' exceeds max length {MAX_MODEL_NAME_LEN}"
        ));
    }
    if !name.is_ascii() {
        return Err(format!("model name '{name}' must be ASCII"));
    }

    Ok(())
}

/// Ensure property names are non-empty and within the maximum length.
pub fn validate_field_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("field name is empty".to_string());
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(format!(
            "field name '{name}' exceeds max length {MAX_FIELD_NAME_LEN}"
        ));
    }

    Ok(())
}
