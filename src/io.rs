use std::path::PathBuf;

use thiserror::Error;

use crate::model::AssignmentModel;

/// Loads an assignment-rule model definition from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the model definition
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(AssignmentModel)` - The parsed model. Its steady state has not been computed yet.
/// * `Err(IOError)` - An error that occurred during file reading or JSON parsing
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents cannot be parsed as a model definition (`IOError::JsonParseError`)
pub fn load_model(path: impl Into<PathBuf>) -> Result<AssignmentModel, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves an assignment-rule model definition to a JSON file.
///
/// Only the definition is written: parameters, species and rules. Derived steady-state
/// values are recomputed after loading.
pub fn save_model(path: impl Into<PathBuf>, model: &AssignmentModel) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, model).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing model definitions.
#[derive(Error, Debug)]
pub enum IOError {
    /// The file could not be found, opened or created.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// The file contents could not be parsed or serialized as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}
