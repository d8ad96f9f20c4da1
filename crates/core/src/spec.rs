use crate::error::{FlagError, Result};
use crate::int::FlagInt;
use std::collections::HashSet;

/// Flag metadata as it is stored next to an encoded flag array.
///
/// `meanings[i]` is set for a raw sample when `raw & masks[i] == values[i]`.
/// When no masks are given every mask defaults to [`FlagInt::ALL_BITS`], i.e.
/// the whole raw value is compared against the flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec<T: FlagInt> {
    /// Mnemonic label for each flag value
    pub meanings: Vec<String>,

    /// Bit pattern that indicates each meaning after masking
    pub values: Vec<T>,

    /// Bits relevant to each meaning (`None` = no mask)
    pub masks: Option<Vec<T>>,

    /// Raw value that marks a sample without data
    pub fill_value: Option<T>,

    /// Free-text label, e.g. the variable name
    pub name: Option<String>,
}

impl<T: FlagInt> FlagSpec<T> {
    pub fn new<I, S>(meanings: I, values: Vec<T>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            meanings: meanings.into_iter().map(Into::into).collect(),
            values,
            masks: None,
            fill_value: None,
            name: None,
        }
    }

    pub fn with_masks(mut self, masks: Vec<T>) -> Self {
        self.masks = Some(masks);
        self
    }

    pub fn with_fill_value(mut self, fill_value: T) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Masks with the default applied
    pub fn resolved_masks(&self) -> Vec<T> {
        match &self.masks {
            Some(masks) => masks.clone(),
            None => vec![T::ALL_BITS; self.values.len()],
        }
    }

    /// Check the metadata invariants.
    ///
    /// Checks run in a fixed order so the first violation reported is
    /// deterministic: emptiness, values length, masks length, duplicate
    /// meanings, then value/mask consistency.
    pub fn validate(&self) -> Result<()> {
        let n = self.meanings.len();
        if n == 0 {
            return Err(FlagError::EmptyMeanings);
        }

        if self.values.len() != n {
            return Err(FlagError::ShapeMismatch {
                field: "flag_values",
                meanings: n,
                actual: self.values.len(),
            });
        }

        if let Some(masks) = &self.masks {
            if masks.len() != n {
                return Err(FlagError::ShapeMismatch {
                    field: "flag_masks",
                    meanings: n,
                    actual: masks.len(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(n);
        for meaning in &self.meanings {
            if !seen.insert(meaning.as_str()) {
                return Err(FlagError::DuplicateMeaning(meaning.clone()));
            }
        }

        for ((meaning, &value), mask) in self
            .meanings
            .iter()
            .zip(&self.values)
            .zip(self.resolved_masks())
        {
            if value & mask != value {
                return Err(FlagError::InvalidMask {
                    meaning: meaning.clone(),
                    value: value.to_i128(),
                    mask: mask.to_i128(),
                });
            }
        }

        Ok(())
    }
}
