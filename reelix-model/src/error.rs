use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug)]
pub enum ModelError {
    InvalidDescriptor(String),
    InvalidProgress(u32),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidDescriptor(msg) => {
                write!(f, "invalid media descriptor: {msg}")
            }
            ModelError::InvalidProgress(value) => {
                write!(f, "progress out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
