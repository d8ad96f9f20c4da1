//! # ncflag core
//!
//! Interpretation of bitwise quality flags stored in scientific arrays,
//! following the CF conventions `flag_meanings` / `flag_values` /
//! `flag_masks` attributes.
//!
//! A meaning is said to be set in a raw sample when
//! `raw & flag_masks[i] == flag_values[i]`. Samples equal to the fill value
//! have no flags set.
//!
//! ## Architecture
//!
//! ```text
//! FlagSpec (meanings, values, masks?, fill?, name?)
//!     │
//!     ├──> validate()  (lengths, duplicates, value ⊆ mask)
//!     │
//!     └──> FlagRegistry
//!            ├─ meaning → slot lookup
//!            ├─ queries over a borrowed ndarray (get_flag, find_flag, ...)
//!            ├─ in-place mutation (set_flag, set_flag_at_index, ...)
//!            └─ reduce() along an axis
//! ```
//!
//! ## Example
//!
//! ```
//! use ncflag_core::{FlagRegistry, FlagSpec};
//! use ndarray::arr1;
//!
//! # fn main() -> ncflag_core::Result<()> {
//! let registry = FlagRegistry::new(
//!     FlagSpec::new(["good", "temp_anomaly", "maneuver"], vec![0u8, 1, 2])
//!         .with_masks(vec![3, 1, 2]),
//! )?;
//!
//! let mut flags = arr1(&[0u8, 1, 2, 3]);
//! assert_eq!(registry.get_flags_set_at_index(&flags, 3)?, vec!["temp_anomaly", "maneuver"]);
//!
//! registry.set_flag_at_index(&mut flags, "maneuver", 0)?;
//! assert!(registry.get_flag_at_index(&flags, "maneuver", 0)?);
//! # Ok(())
//! # }
//! ```

mod error;
mod int;
mod registry;
mod spec;

pub use error::{FlagError, Result};
pub use int::FlagInt;
pub use registry::FlagRegistry;
pub use spec::FlagSpec;
