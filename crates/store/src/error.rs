use crate::types::DType;
use ncflag_core::FlagError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Variable {variable} uses undeclared dimension {dimension}")]
    DimensionNotFound { variable: String, dimension: String },

    #[error("Not a flag variable: {variable} is missing attributes {missing:?}")]
    NotAFlagVariable {
        variable: String,
        missing: Vec<&'static str>,
    },

    #[error("Variable {variable} has no {attribute} attribute")]
    MissingAttribute {
        variable: String,
        attribute: &'static str,
    },

    #[error("Invalid {attribute} attribute on {variable}: {reason}")]
    InvalidAttribute {
        variable: String,
        attribute: &'static str,
        reason: String,
    },

    #[error("Variable {variable} has dtype {actual}, expected {expected}")]
    DTypeMismatch {
        variable: String,
        expected: DType,
        actual: DType,
    },

    #[error("Value {value} does not fit dtype of {variable}")]
    ValueOutOfRange { variable: String, value: String },

    #[error("Variable {variable} has no value at position {position} and no _FillValue")]
    MissingValue { variable: String, position: usize },

    #[error("Variable {variable} holds {actual} values, its dimensions require {expected}")]
    DataShape {
        variable: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),

    #[error("Array shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Flag(#[from] FlagError),
}

impl StoreError {
    pub(crate) fn invalid_attribute(
        variable: &str,
        attribute: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            variable: variable.to_string(),
            attribute,
            reason: reason.into(),
        }
    }
}
