use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("label name is empty")]
    EmptyName,

    #[error("invalid label name '{name}': allowed characters are [a-zA-Z0-9/._*-]")]
    InvalidName { name: String },

    #[error("label '{label}': period must be greater than zero")]
    InvalidPeriod { label: String },

    #[error("label '{label}': command is empty")]
    EmptyCommand { label: String },

    #[error("label '{label}': timeout must be greater than zero when set")]
    InvalidTimeout { label: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
