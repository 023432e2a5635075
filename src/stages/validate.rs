use crate::error::ValidationError;
use crate::models::Transcript;

/// Minimum trimmed transcript length, in characters
pub const DEFAULT_MIN_TRANSCRIPT_CHARS: usize = 10;

/// Execute the validate stage
///
/// Rejects blank input and input whose trimmed length is under `min_chars`.
/// Accepted text is kept untrimmed and is never truncated.
pub fn validate(text: &str, min_chars: usize) -> Result<Transcript, ValidationError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let length = trimmed.chars().count();
    if length < min_chars {
        return Err(ValidationError::TooShort {
            length,
            minimum: min_chars,
        });
    }

    Ok(Transcript::accepted(text.to_string()))
}
