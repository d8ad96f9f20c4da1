use anyhow::{bail, Context, Result};
use ncflag_store::{decode_times, read_flag, DType, Dataset, FlagVariable, StoredInt, UNITS};
use serde::Serialize;
use std::io::Write;

/// Printed in place of a timestamp that cannot be decoded
const MISSING_TIME: &str = "__________________________";

/// Run `$func::<T>(args)` with `T` matching a variable's integer dtype
macro_rules! with_flag_int {
    ($dtype:expr, $name:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $dtype {
            DType::I8 => $func::<i8>($($arg),*),
            DType::I16 => $func::<i16>($($arg),*),
            DType::I32 => $func::<i32>($($arg),*),
            DType::I64 => $func::<i64>($($arg),*),
            DType::U8 => $func::<u8>($($arg),*),
            DType::U16 => $func::<u16>($($arg),*),
            DType::U32 => $func::<u32>($($arg),*),
            DType::U64 => $func::<u64>($($arg),*),
            dtype @ (DType::F32 | DType::F64) => {
                bail!("not a flag variable: {} has non-integer dtype {dtype}", $name)
            }
        }
    };
}

#[derive(Serialize)]
struct PositionReport<'a> {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<Option<String>>,
    flags: Vec<&'a str>,
}

#[derive(Serialize)]
struct MeaningReport<'a> {
    meaning: &'a str,
    value: i128,
    mask: i128,
}

/// List the variables that can be inspected
pub(crate) fn show_flag_variables(dataset: &Dataset, json: bool, out: &mut dyn Write) -> Result<()> {
    let names = dataset.flag_variables();
    if json {
        writeln!(out, "{}", serde_json::json!({ "flags": names }))?;
    } else {
        writeln!(out, "Inspectable flags: {}", names.join(" "))?;
    }
    Ok(())
}

/// Print the meanings of one flag variable with their values and masks
pub(crate) fn show_meanings(dataset: &Dataset, flag: &str, json: bool, out: &mut dyn Write) -> Result<()> {
    let variable = dataset.variable(flag)?;
    with_flag_int!(variable.dtype, flag, show_meanings_typed(dataset, flag, json, out))
}

fn show_meanings_typed<T: StoredInt>(
    dataset: &Dataset,
    flag: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let FlagVariable { registry, .. } = read_flag::<T>(dataset, flag)?;
    for (meaning, value, mask) in registry.iter() {
        if json {
            let report = MeaningReport {
                meaning,
                value: value.to_i128(),
                mask: mask.to_i128(),
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            writeln!(out, "{meaning}: value {value}, mask {mask}")?;
        }
    }
    Ok(())
}

/// Print the meanings set at every position of a one-dimensional flag
pub(crate) fn report_flags(
    dataset: &Dataset,
    flag: &str,
    time_var: Option<&str>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let variable = dataset.variable(flag)?;

    let missing = variable.missing_flag_attributes();
    if !missing.is_empty() {
        bail!(
            "not a flag variable: {flag} is missing attributes {}",
            missing.join(", ")
        );
    }
    if variable.dimensions.len() != 1 {
        bail!("multidimensional flags are not supported");
    }

    let times = time_var
        .map(|time_var| time_labels(dataset, flag, time_var))
        .transpose()?;

    with_flag_int!(
        variable.dtype,
        flag,
        report_flags_typed(dataset, flag, times.as_deref(), json, out)
    )
}

fn report_flags_typed<T: StoredInt>(
    dataset: &Dataset,
    flag: &str,
    times: Option<&[Option<String>]>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let FlagVariable { registry, flags } = read_flag::<T>(dataset, flag)?;

    for index in 0..flags.len() {
        let set = registry.get_flags_set_at_index(&flags, [index])?;
        let time = times.map(|times| times.get(index).cloned().flatten());

        if json {
            let report = PositionReport {
                index,
                time,
                flags: set,
            };
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            let label = match time {
                Some(Some(time)) => time,
                Some(None) => MISSING_TIME.to_string(),
                None => index.to_string(),
            };
            writeln!(out, "{label}: {set:?}")?;
        }
    }
    Ok(())
}

/// ISO-8601 timestamps for each position, `None` where undecodable
fn time_labels(dataset: &Dataset, flag: &str, time_var: &str) -> Result<Vec<Option<String>>> {
    let flag_dims = &dataset.variable(flag)?.dimensions;
    let time = dataset.variable(time_var)?;

    if &time.dimensions != flag_dims {
        bail!("To print flags by time, time must share dimensions");
    }
    if time.attribute(UNITS).is_none() {
        bail!("did not find units on time variable {time_var}");
    }

    let times = decode_times(time_var, time)
        .with_context(|| format!("Failed to decode time variable {time_var}"))?;
    log::debug!("Decoded {} timestamps from {time_var}", times.len());

    Ok(times
        .into_iter()
        .map(|time| time.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        .collect())
}
