use crate::error::ProbeError;

/// Maximum text length accepted by the synthesis endpoints
const MAX_TEXT_LENGTH: usize = 2000;

/// Validate the text sent for synthesis
pub fn validate_text(text: &str) -> Result<(), ProbeError> {
    if text.trim().is_empty() {
        return Err(ProbeError::InvalidInput("Text cannot be empty".to_string()));
    }
    let len = text.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(ProbeError::InvalidInput(format!(
            "Text too long ({} characters, max {})",
            len, MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// Validate a voice or model identifier
pub fn validate_id(kind: &str, id: &str) -> Result<(), ProbeError> {
    if id.is_empty() {
        return Err(ProbeError::InvalidInput(format!("{kind} cannot be empty")));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(ProbeError::InvalidInput(format!(
            "Invalid {kind}: {id:?} must not contain whitespace"
        )));
    }
    Ok(())
}
