use thiserror::Error;

use dlabel_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid label configuration: {0}")]
    Config(#[from] ModelError),
}
