use thiserror::Error;

/// Result type for flag operations
pub type Result<T> = std::result::Result<T, FlagError>;

/// Errors raised by flag metadata validation and flag queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// No flag meanings were supplied
    #[error("flag metadata is empty: at least one flag meaning is required")]
    EmptyMeanings,

    /// A metadata sequence does not have one entry per meaning
    #[error("flag_meanings vs {field} length mismatch: {meanings} != {actual}")]
    ShapeMismatch {
        field: &'static str,
        meanings: usize,
        actual: usize,
    },

    /// The same meaning was registered twice
    #[error("duplicate flag meaning: {0}")]
    DuplicateMeaning(String),

    /// A flag value carries bits that its mask would discard
    #[error("flag value {value} of '{meaning}' has bits outside its mask {mask}")]
    InvalidMask {
        meaning: String,
        value: i128,
        mask: i128,
    },

    /// Meaning is not registered
    #[error("unknown flag meaning: {0}")]
    UnknownMeaning(String),

    /// None of a list of alternative meanings is registered
    #[error("none of the flag meanings {0:?} are registered")]
    NoKnownMeaning(Vec<String>),

    /// Index does not address an element of the flag array
    #[error("index {0} is out of bounds for the flag array")]
    IndexOutOfBounds(String),

    /// Axis does not exist on the flag array
    #[error("axis {axis} is out of bounds for a flag array with {ndim} dimensions")]
    AxisOutOfBounds { axis: isize, ndim: usize },

    /// Selection array shape differs from the flag array shape
    #[error("selection shape {actual:?} does not match flag array shape {expected:?}")]
    SelectionShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

impl FlagError {
    /// Create an unknown meaning error
    pub fn unknown_meaning(meaning: impl Into<String>) -> Self {
        Self::UnknownMeaning(meaning.into())
    }

    /// Create an out-of-bounds error from any printable index
    pub fn index_out_of_bounds(index: impl std::fmt::Debug) -> Self {
        Self::IndexOutOfBounds(format!("{index:?}"))
    }
}
