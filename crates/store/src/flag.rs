use crate::error::{Result, StoreError};
use crate::types::{DType, Dataset, Variable, FILL_VALUE, FLAG_MASKS, FLAG_MEANINGS, FLAG_VALUES};
use ncflag_core::{FlagInt, FlagRegistry, FlagSpec};
use ndarray::{ArrayD, IxDyn};
use serde_json::{Number, Value};

/// A [`FlagInt`] type with a stored dtype
pub trait StoredInt: FlagInt {
    const DTYPE: DType;
}

macro_rules! impl_stored_int {
    ($($t:ty => $dtype:ident),* $(,)?) => {
        $(
            impl StoredInt for $t {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_stored_int!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
);

/// A flag variable loaded from a dataset: its metadata and its data
#[derive(Debug, Clone)]
pub struct FlagVariable<T: FlagInt> {
    pub registry: FlagRegistry<T>,
    pub flags: ArrayD<T>,
}

/// Read the metadata and data of flag variable `name`.
///
/// `null` samples are read as the fill value.
pub fn read_flag<T: StoredInt>(dataset: &Dataset, name: &str) -> Result<FlagVariable<T>> {
    let registry = read_registry::<T>(dataset, name)?;
    let variable = dataset.variable(name)?;
    let shape = dataset.shape_of(name)?;

    let expected: usize = shape.iter().product();
    if variable.data.len() != expected {
        return Err(StoreError::DataShape {
            variable: name.to_string(),
            expected,
            actual: variable.data.len(),
        });
    }

    let data = variable
        .data
        .iter()
        .enumerate()
        .map(|(position, value)| match value {
            Value::Null => registry.fill_value().ok_or_else(|| StoreError::MissingValue {
                variable: name.to_string(),
                position,
            }),
            value => json_to_int(name, value),
        })
        .collect::<Result<Vec<T>>>()?;

    log::debug!("Read flag variable {name} with shape {shape:?}");
    let flags = ArrayD::from_shape_vec(IxDyn(&shape), data)?;
    Ok(FlagVariable { registry, flags })
}

/// Read the metadata of flag variable `name` and start from an array of `fill`
/// shaped like the variable, ignoring any stored data.
pub fn init_flag<T: StoredInt>(dataset: &Dataset, name: &str, fill: T) -> Result<FlagVariable<T>> {
    let registry = read_registry::<T>(dataset, name)?;
    let shape = dataset.shape_of(name)?;
    log::debug!("Initialized flag variable {name} with shape {shape:?} and fill {fill}");
    Ok(FlagVariable {
        registry,
        flags: ArrayD::from_elem(IxDyn(&shape), fill),
    })
}

/// Write data and metadata of `flag` to variable `name`.
///
/// `flag_masks` is only written when some mask is not the default; otherwise
/// any stale attribute is removed.
pub fn write_flag<T: StoredInt>(dataset: &mut Dataset, name: &str, flag: &FlagVariable<T>) -> Result<()> {
    let shape = dataset.shape_of(name)?;
    if shape.as_slice() != flag.flags.shape() {
        return Err(StoreError::DataShape {
            variable: name.to_string(),
            expected: shape.iter().product(),
            actual: flag.flags.len(),
        });
    }

    let registry = &flag.registry;
    if let Some(meaning) = registry
        .meanings()
        .iter()
        .find(|meaning| meaning.is_empty() || meaning.contains(char::is_whitespace))
    {
        return Err(StoreError::invalid_attribute(
            name,
            FLAG_MEANINGS,
            format!("meaning {meaning:?} cannot be stored in a space separated list"),
        ));
    }

    let variable = dataset.variable_mut(name)?;
    check_dtype::<T>(name, variable)?;

    variable.data = flag.flags.iter().map(|&raw| int_to_json(raw)).collect();

    let attributes = &mut variable.attributes;
    attributes.insert(
        FLAG_MEANINGS.to_string(),
        Value::String(registry.meanings().join(" ")),
    );
    attributes.insert(
        FLAG_VALUES.to_string(),
        Value::Array(registry.values().iter().map(|&v| int_to_json(v)).collect()),
    );
    if registry.has_default_masks() {
        attributes.remove(FLAG_MASKS);
    } else {
        attributes.insert(
            FLAG_MASKS.to_string(),
            Value::Array(registry.masks().iter().map(|&m| int_to_json(m)).collect()),
        );
    }
    match registry.fill_value() {
        Some(fill) => {
            attributes.insert(FILL_VALUE.to_string(), int_to_json(fill));
        }
        None => {
            attributes.remove(FILL_VALUE);
        }
    }

    log::debug!("Wrote flag variable {name} ({} values)", flag.flags.len());
    Ok(())
}

fn read_registry<T: StoredInt>(dataset: &Dataset, name: &str) -> Result<FlagRegistry<T>> {
    let variable = dataset.variable(name)?;
    check_dtype::<T>(name, variable)?;

    let missing = variable.missing_flag_attributes();
    if !missing.is_empty() {
        return Err(StoreError::NotAFlagVariable {
            variable: name.to_string(),
            missing,
        });
    }

    let meanings = read_meanings(name, variable)?;
    let values = read_int_list::<T>(name, variable, FLAG_VALUES)?.unwrap_or_default();
    let mut spec = FlagSpec::new(meanings, values).with_name(name);
    if let Some(masks) = read_int_list::<T>(name, variable, FLAG_MASKS)? {
        spec = spec.with_masks(masks);
    }
    if let Some(fill) = variable.attribute(FILL_VALUE) {
        spec = spec.with_fill_value(json_to_int(name, fill)?);
    }

    Ok(FlagRegistry::new(spec)?)
}

fn check_dtype<T: StoredInt>(name: &str, variable: &Variable) -> Result<()> {
    if variable.dtype != T::DTYPE {
        return Err(StoreError::DTypeMismatch {
            variable: name.to_string(),
            expected: T::DTYPE,
            actual: variable.dtype,
        });
    }
    Ok(())
}

/// `flag_meanings` is a whitespace separated string; a list of strings is
/// accepted too.
fn read_meanings(name: &str, variable: &Variable) -> Result<Vec<String>> {
    match variable.attribute(FLAG_MEANINGS) {
        Some(Value::String(joined)) => Ok(joined.split_whitespace().map(str::to_string).collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    StoreError::invalid_attribute(name, FLAG_MEANINGS, format!("{item} is not a string"))
                })
            })
            .collect(),
        Some(other) => Err(StoreError::invalid_attribute(
            name,
            FLAG_MEANINGS,
            format!("expected a string, found {other}"),
        )),
        None => Err(StoreError::MissingAttribute {
            variable: name.to_string(),
            attribute: FLAG_MEANINGS,
        }),
    }
}

/// An integer list attribute; a scalar is a list of one
fn read_int_list<T: FlagInt>(name: &str, variable: &Variable, attribute: &'static str) -> Result<Option<Vec<T>>> {
    match variable.attribute(attribute) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| json_to_int(name, item))
            .collect::<Result<Vec<T>>>()
            .map(Some),
        Some(scalar @ Value::Number(_)) => Ok(Some(vec![json_to_int(name, scalar)?])),
        Some(other) => Err(StoreError::invalid_attribute(
            name,
            attribute,
            format!("expected a list of integers, found {other}"),
        )),
    }
}

fn json_to_int<T: FlagInt>(name: &str, value: &Value) -> Result<T> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i128)
        })
        .and_then(T::from_i128)
        .ok_or_else(|| StoreError::ValueOutOfRange {
            variable: name.to_string(),
            value: value.to_string(),
        })
}

fn int_to_json<T: FlagInt>(raw: T) -> Value {
    let wide = raw.to_i128();
    let number = match i64::try_from(wide) {
        Ok(signed) => Number::from(signed),
        // only u64 values above i64::MAX get here
        Err(_) => Number::from(wide as u64),
    };
    Value::Number(number)
}
