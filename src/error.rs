use crate::utils::time::Timestamp;
use thiserror::Error;

/// Failures reported by the field-model engine itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused the calendar values it was handed
    #[error("invalid calendar values: {0}")]
    Calendar(String),

    /// The engine is not in a usable state, e.g. no coefficients loaded
    #[error("engine state error: {0}")]
    State(String),

    /// A single point could not be converted
    #[error("conversion failed: {0}")]
    Conversion(String),
}

#[derive(Error, Debug)]
pub enum AacgmError {
    /// Represents a time, latitude or other input that is not physically sensible
    #[error("{0}")]
    InvalidInput(String),

    /// A method code that could not be resolved into a bit mask
    #[error("unknown method code {0}")]
    InvalidMethod(String),

    /// Batched inputs whose shapes cannot be matched up, by input name
    #[error("{}", mismatch_message(.inputs))]
    DimensionMismatch { inputs: Vec<&'static str> },

    /// The engine would not accept the epoch
    #[error("unable to set time for {time}: {source}")]
    Epoch {
        time: Timestamp,
        source: EngineError,
    },
}

fn mismatch_message(inputs: &[&str]) -> String {
    match inputs {
        [] => "arrays are mismatched".to_string(),
        [only] => format!("{only} array is mismatched"),
        [first, second] => format!("{first} and {second} arrays are mismatched"),
        [init @ .., last] => format!("{}, and {last} arrays are mismatched", init.join(", ")),
    }
}

#[cfg(feature = "python")]
impl From<AacgmError> for pyo3::PyErr {
    fn from(value: AacgmError) -> Self {
        use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};

        let msg = value.to_string();
        match value {
            AacgmError::Epoch {
                source: EngineError::Calendar(_),
                ..
            } => PyTypeError::new_err(msg),
            AacgmError::Epoch { .. } => PyRuntimeError::new_err(msg),
            _ => PyValueError::new_err(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_mismatch_names_everything() {
        let err = AacgmError::DimensionMismatch {
            inputs: vec!["lat", "lon", "height"],
        };
        assert_eq!(err.to_string(), "lat, lon, and height arrays are mismatched");
    }

    #[test]
    fn two_way_mismatch_names_the_pair() {
        let err = AacgmError::DimensionMismatch {
            inputs: vec!["lon", "height"],
        };
        assert_eq!(err.to_string(), "lon and height arrays are mismatched");
    }
}
