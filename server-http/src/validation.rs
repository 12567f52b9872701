/// Longest accepted search term, in characters.
pub const MAX_TERM_CHARS: usize = 200;

#[derive(Debug)]
pub enum ValidationError {
    MissingTerm,
    BlankTerm,
    TermTooLong { length: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingTerm => {
                write!(f, "Query parameter 'q' is required")
            }
            ValidationError::BlankTerm => {
                write!(f, "Query parameter 'q' must not be blank")
            }
            ValidationError::TermTooLong { length, max } => {
                write!(
                    f,
                    "Query parameter 'q' is {} characters long, the maximum is {}",
                    length, max
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a raw `q` value before it reaches the search paths. Returns the
/// trimmed term; case is left alone for echoing back to the client.
pub fn validate_term(raw: Option<&str>) -> Result<&str, ValidationError> {
    let term = raw.ok_or(ValidationError::MissingTerm)?;
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankTerm);
    }

    let length = trimmed.chars().count();
    if length > MAX_TERM_CHARS {
        return Err(ValidationError::TermTooLong {
            length,
            max: MAX_TERM_CHARS,
        });
    }

    Ok(trimmed)
}
