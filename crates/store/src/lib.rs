//! # ncflag store
//!
//! Reads and writes flag variables held in JSON dataset documents: named
//! dimensions plus typed, dimensioned variables carrying attributes, in the
//! spirit of a netCDF file.
//!
//! ## Features
//!
//! - **Flag variables** - `flag_meanings`, `flag_values`, optional
//!   `flag_masks` and `_FillValue` into a [`FlagRegistry`](ncflag_core::FlagRegistry)
//! - **Typed data** - element dtype checked against the requested integer type
//! - **Write back** - data and metadata, omitting default masks
//! - **Time coordinates** - CF `"<unit> since <date>"` decoding
//!
//! ## Example
//!
//! ```no_run
//! use ncflag_store::{read_flag, write_flag, Dataset};
//!
//! fn main() -> ncflag_store::Result<()> {
//!     let mut dataset = Dataset::open("granule.json")?;
//!     let mut flag = read_flag::<u8>(&dataset, "quality_flags")?;
//!
//!     flag.registry.set_flag_at_index(&mut flag.flags, "maneuver", [0])?;
//!     write_flag(&mut dataset, "quality_flags", &flag)?;
//!     dataset.save("granule.json")
//! }
//! ```

mod dataset;
mod error;
mod flag;
mod time;
mod types;

pub use error::{Result, StoreError};
pub use flag::{init_flag, read_flag, write_flag, FlagVariable, StoredInt};
pub use time::{decode_times, TimeUnits};
pub use types::{
    DType, Dataset, Variable, FILL_VALUE, FLAG_MASKS, FLAG_MEANINGS, FLAG_VALUES, UNITS,
};
