//! Input validation limits for person attributes and queries

use crate::error::Error;

/// Maximum length for a person's full name (256 chars)
pub const MAX_NAME_LEN: usize = 256;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BlankName,
    NameTooLong { len: usize, max: usize },
    NegativeBirthYear { year: i32 },
    DeathBeforeBirth { birth: i32, death: i32 },
    NegativeGeneration { generation: i32 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "Full name cannot be blank"),
            Self::NameTooLong { len, max } => {
                write!(f, "Full name too long: {} chars (max {})", len, max)
            }
            Self::NegativeBirthYear { year } => {
                write!(f, "Birth year must be non-negative (got {})", year)
            }
            Self::DeathBeforeBirth { birth, death } => {
                write!(
                    f,
                    "Death year cannot be before birth year ({} < {})",
                    death, birth
                )
            }
            Self::NegativeGeneration { generation } => {
                write!(f, "Generation cannot be negative (got {})", generation)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NegativeGeneration { .. } => Error::InvalidQuery(err.to_string()),
            _ => Error::InvalidAttribute(err.to_string()),
        }
    }
}

/// Validate full name
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate birth year
pub fn validate_birth_year(year: i32) -> Result<(), ValidationError> {
    if year < 0 {
        return Err(ValidationError::NegativeBirthYear { year });
    }
    Ok(())
}

/// Validate an optional death year against a birth year
pub fn validate_death_year(birth: i32, death: Option<i32>) -> Result<(), ValidationError> {
    match death {
        Some(death) if death < birth => Err(ValidationError::DeathBeforeBirth { birth, death }),
        _ => Ok(()),
    }
}

/// Validate generation distance
pub fn validate_generation(generation: i32) -> Result<(), ValidationError> {
    if generation < 0 {
        return Err(ValidationError::NegativeGeneration { generation });
    }
    Ok(())
}
