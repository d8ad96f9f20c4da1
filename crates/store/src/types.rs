use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute names of the CF flag convention
pub const FLAG_MEANINGS: &str = "flag_meanings";
pub const FLAG_VALUES: &str = "flag_values";
pub const FLAG_MASKS: &str = "flag_masks";
pub const FILL_VALUE: &str = "_FillValue";
pub const UNITS: &str = "units";

/// Element type of a stored variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl DType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::U64 => "u64",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(self, DType::F32 | DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-describing collection of named, dimensioned variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dimension name -> length
    #[serde(default)]
    pub dimensions: BTreeMap<String, usize>,

    #[serde(default)]
    pub variables: BTreeMap<String, Variable>,
}

/// One variable: typed data in row-major order plus its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub dtype: DType,

    /// Dimension names, outermost first. Empty for a scalar.
    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    /// Row-major values; `null` marks a missing sample
    #[serde(default)]
    pub data: Vec<Value>,
}

impl Variable {
    pub fn new(dtype: DType, dimensions: Vec<String>) -> Self {
        Self {
            dtype,
            dimensions,
            attributes: BTreeMap::new(),
            data: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Flag attributes this variable lacks
    pub fn missing_flag_attributes(&self) -> Vec<&'static str> {
        [FLAG_VALUES, FLAG_MEANINGS]
            .into_iter()
            .filter(|name| !self.attributes.contains_key(*name))
            .collect()
    }

    pub fn is_flag_variable(&self) -> bool {
        self.missing_flag_attributes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dtype_serde() {
        assert_eq!(serde_json::to_value(DType::U16).unwrap(), json!("u16"));
        let dtype: DType = serde_json::from_value(json!("f64")).unwrap();
        assert_eq!(dtype, DType::F64);
        assert!(!dtype.is_integer());
        assert!(DType::I8.is_integer());
    }

    #[test]
    fn test_flag_attribute_detection() {
        let mut variable = Variable::new(DType::U8, vec!["time".to_string()]);
        assert_eq!(variable.missing_flag_attributes(), vec![FLAG_VALUES, FLAG_MEANINGS]);

        variable
            .attributes
            .insert(FLAG_MEANINGS.to_string(), json!("good bad"));
        assert_eq!(variable.missing_flag_attributes(), vec![FLAG_VALUES]);

        variable.attributes.insert(FLAG_VALUES.to_string(), json!([0, 1]));
        assert!(variable.is_flag_variable());
    }
}
