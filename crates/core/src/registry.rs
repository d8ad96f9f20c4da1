use crate::error::{FlagError, Result};
use crate::int::FlagInt;
use crate::spec::FlagSpec;
use ndarray::{Array, ArrayBase, Axis, Data, DataMut, Dimension, NdIndex, RemoveAxis, Zip};
use std::collections::HashMap;
use std::fmt::Debug;

/// Validated flag metadata with O(1) meaning lookup.
///
/// The registry never owns the encoded flag array. Queries borrow it, and the
/// `set_*` operations write into the caller's array in place, so callers that
/// need the original values must copy it first.
#[derive(Debug, Clone)]
pub struct FlagRegistry<T: FlagInt> {
    name: Option<String>,
    meanings: Vec<String>,
    values: Vec<T>,
    masks: Vec<T>,
    fill_value: Option<T>,
    lookup: HashMap<String, usize>,
    /// Slot of a zero-valued meaning whose mask covers every other mask while
    /// no other meaning is zero-valued. When it is set nothing else can be.
    exclusive_good: Option<usize>,
}

impl<T: FlagInt> FlagRegistry<T> {
    /// Validate `spec` and build the lookup table
    pub fn new(spec: FlagSpec<T>) -> Result<Self> {
        spec.validate()?;

        let masks = spec.resolved_masks();
        let FlagSpec {
            meanings,
            values,
            fill_value,
            name,
            ..
        } = spec;

        let lookup = meanings
            .iter()
            .enumerate()
            .map(|(slot, meaning)| (meaning.clone(), slot))
            .collect();

        let exclusive_good = find_exclusive_good(&values, &masks);
        if let Some(slot) = exclusive_good {
            log::debug!(
                "'{}' is exclusive of every other flag meaning, enabling fast path",
                meanings[slot]
            );
        }

        Ok(Self {
            name,
            meanings,
            values,
            masks,
            fill_value,
            lookup,
            exclusive_good,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn meanings(&self) -> &[String] {
        &self.meanings
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Masks, with [`FlagInt::ALL_BITS`] where none were given
    pub fn masks(&self) -> &[T] {
        &self.masks
    }

    pub fn fill_value(&self) -> Option<T> {
        self.fill_value
    }

    /// Number of registered meanings
    pub fn len(&self) -> usize {
        self.meanings.len()
    }

    /// Always false for a constructed registry
    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty()
    }

    /// True when every mask is the "no mask" default
    pub fn has_default_masks(&self) -> bool {
        self.masks.iter().all(|&mask| mask == T::ALL_BITS)
    }

    /// Iterate `(meaning, value, mask)` in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, T, T)> + '_ {
        self.meanings
            .iter()
            .zip(&self.values)
            .zip(&self.masks)
            .map(|((meaning, &value), &mask)| (meaning.as_str(), value, mask))
    }

    /// Rebuild the metadata this registry was constructed from
    pub fn to_spec(&self) -> FlagSpec<T> {
        FlagSpec {
            meanings: self.meanings.clone(),
            values: self.values.clone(),
            masks: Some(self.masks.clone()),
            fill_value: self.fill_value,
            name: self.name.clone(),
        }
    }

    /// Whether `meaning` is registered
    pub fn is_valid_meaning(&self, meaning: &str) -> bool {
        self.lookup.contains_key(meaning)
    }

    /// Value that indicates `meaning` is set
    pub fn get_value_for_meaning(&self, meaning: &str) -> Result<T> {
        self.slot(meaning).map(|slot| self.values[slot])
    }

    /// Mask used to test whether `meaning` is set.
    ///
    /// `raw & mask == 0` does not imply the meaning is unset: compare against
    /// [`get_value_for_meaning`](Self::get_value_for_meaning). Only where
    /// mask equals value can masks be OR-ed together to test "any of".
    pub fn get_mask_for_meaning(&self, meaning: &str) -> Result<T> {
        self.slot(meaning).map(|slot| self.masks[slot])
    }

    /// Elementwise test of one or more meanings, OR-combined.
    ///
    /// Fill samples are never flagged. With `ignore_missing`, unregistered
    /// meanings contribute nothing; if all of them are unregistered the result
    /// is all false. Without it the first unregistered meaning is an error.
    pub fn get_flag<S, D, M>(
        &self,
        flags: &ArrayBase<S, D>,
        meanings: &[M],
        ignore_missing: bool,
    ) -> Result<Array<bool, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
        M: AsRef<str>,
    {
        let slots = self.resolve(meanings, ignore_missing)?;
        Ok(flags.map(|&raw| slots.iter().any(|&slot| self.test(slot, raw))))
    }

    /// Whether `meaning` is set at `index`
    pub fn get_flag_at_index<S, D, I>(
        &self,
        flags: &ArrayBase<S, D>,
        meaning: &str,
        index: I,
    ) -> Result<bool>
    where
        S: Data<Elem = T>,
        D: Dimension,
        I: NdIndex<D> + Clone + Debug,
    {
        let slot = self.slot(meaning)?;
        let raw = raw_at(flags, index)?;
        Ok(self.test(slot, raw))
    }

    /// All meanings set at `index`, in registration order
    pub fn get_flags_set_at_index<S, D, I>(
        &self,
        flags: &ArrayBase<S, D>,
        index: I,
    ) -> Result<Vec<&str>>
    where
        S: Data<Elem = T>,
        D: Dimension,
        I: NdIndex<D> + Clone + Debug,
    {
        let raw = raw_at(flags, index)?;
        Ok(self.meanings_set_in(raw))
    }

    /// All meanings set in a single raw sample, in registration order
    pub fn meanings_set_in(&self, raw: T) -> Vec<&str> {
        if self.is_fill(raw) {
            return Vec::new();
        }

        if let Some(good) = self.exclusive_good {
            if self.test(good, raw) {
                return vec![self.meanings[good].as_str()];
            }
        }

        self.meanings
            .iter()
            .enumerate()
            .filter(|&(slot, _)| self.test(slot, raw))
            .map(|(_, meaning)| meaning.as_str())
            .collect()
    }

    /// Per position, which of `options` is set there.
    ///
    /// Each element holds the position within `options` of the first option
    /// (in list order) set at that sample, or `None` when none is set or the
    /// sample is fill. Every option must be registered.
    ///
    /// `.map(Option::is_some)` gives the per-position "any option set" mask.
    pub fn find_flag<S, D, M>(
        &self,
        flags: &ArrayBase<S, D>,
        options: &[M],
    ) -> Result<Array<Option<usize>, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
        M: AsRef<str>,
    {
        let slots = self.resolve(options, false)?;
        Ok(flags.map(|&raw| slots.iter().position(|&slot| self.test(slot, raw))))
    }

    /// [`get_flag`](Self::get_flag) for the first of `options` that is
    /// registered.
    ///
    /// Useful while a meaning is being renamed across product versions: list
    /// every spelling and whichever exists is used.
    pub fn first_known_flag<S, D, M>(
        &self,
        flags: &ArrayBase<S, D>,
        options: &[M],
    ) -> Result<Array<bool, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
        M: AsRef<str>,
    {
        for option in options {
            let option: &str = option.as_ref();
            if self.is_valid_meaning(option) {
                return self.get_flag(flags, &[option], false);
            }
        }
        Err(FlagError::NoKnownMeaning(
            options
                .iter()
                .map(|option| option.as_ref().to_string())
                .collect(),
        ))
    }

    /// Set `meaning` wherever `should_be_set` is true, in place.
    ///
    /// Selected samples have the bits under the meaning's mask cleared and the
    /// value OR-ed in, leaving other bits alone. With `zero_if_unset` the masked
    /// bits are cleared at unselected samples too. Without it unselected
    /// samples are untouched, so the meaning stays set where it already was.
    /// A fill sample that gets written is reset to 0 first.
    pub fn set_flag<S, S2, D>(
        &self,
        flags: &mut ArrayBase<S, D>,
        meaning: &str,
        should_be_set: &ArrayBase<S2, D>,
        zero_if_unset: bool,
    ) -> Result<()>
    where
        S: DataMut<Elem = T>,
        S2: Data<Elem = bool>,
        D: Dimension,
    {
        let slot = self.slot(meaning)?;
        if flags.shape() != should_be_set.shape() {
            return Err(FlagError::SelectionShape {
                expected: flags.shape().to_vec(),
                actual: should_be_set.shape().to_vec(),
            });
        }

        let (value, mask) = (self.values[slot], self.masks[slot]);
        Zip::from(flags).and(should_be_set).for_each(|raw, &set| {
            if set || zero_if_unset {
                *raw = self.cleared(*raw, mask);
            }
            if set {
                *raw = *raw | value;
            }
        });
        Ok(())
    }

    /// [`set_flag`](Self::set_flag) with the selection given as a list of
    /// indices. Every index is checked before anything is written.
    pub fn set_flag_at_indices<S, D, I, It>(
        &self,
        flags: &mut ArrayBase<S, D>,
        meaning: &str,
        indices: It,
        zero_if_unset: bool,
    ) -> Result<()>
    where
        S: DataMut<Elem = T>,
        D: Dimension,
        It: IntoIterator<Item = I>,
        I: NdIndex<D> + Clone + Debug,
    {
        self.slot(meaning)?;

        let mut selection = Array::from_elem(flags.raw_dim(), false);
        for index in indices {
            let cell = selection
                .get_mut(index.clone())
                .ok_or_else(|| FlagError::index_out_of_bounds(&index))?;
            *cell = true;
        }

        self.set_flag(flags, meaning, &selection, zero_if_unset)
    }

    /// Set `meaning` at a single index, in place
    pub fn set_flag_at_index<S, D, I>(
        &self,
        flags: &mut ArrayBase<S, D>,
        meaning: &str,
        index: I,
    ) -> Result<()>
    where
        S: DataMut<Elem = T>,
        D: Dimension,
        I: NdIndex<D> + Clone + Debug,
    {
        let slot = self.slot(meaning)?;
        let raw = flags
            .get_mut(index.clone())
            .ok_or_else(|| FlagError::index_out_of_bounds(&index))?;
        *raw = self.cleared(*raw, self.masks[slot]) | self.values[slot];
        Ok(())
    }

    /// OR-reduce raw samples along `axis` (negative counts from the end).
    ///
    /// A sample with any bit in `exclude_mask` is dropped from its lane as a
    /// whole. Fill samples never contribute: a lane holding only fill reduces
    /// to the fill value, while a lane whose data samples were all excluded
    /// reduces to 0. The result uses this registry's metadata unchanged.
    pub fn reduce<S, D>(
        &self,
        flags: &ArrayBase<S, D>,
        exclude_mask: T,
        axis: isize,
    ) -> Result<Array<T, D::Smaller>>
    where
        S: Data<Elem = T>,
        D: RemoveAxis,
    {
        let axis = normalize_axis(axis, flags.ndim())?;
        Ok(flags.map_axis(Axis(axis), |lane| {
            self.reduce_lane(lane.iter().copied(), exclude_mask)
        }))
    }

    fn reduce_lane(&self, samples: impl Iterator<Item = T>, exclude_mask: T) -> T {
        let mut reduced = T::ZERO;
        let mut saw_sample = false;
        let mut saw_data = false;

        for raw in samples {
            saw_sample = true;
            if self.is_fill(raw) {
                continue;
            }
            saw_data = true;
            if raw & exclude_mask != T::ZERO {
                continue;
            }
            reduced = reduced | raw;
        }

        match self.fill_value {
            Some(fill) if saw_sample && !saw_data => fill,
            _ => reduced,
        }
    }

    fn slot(&self, meaning: &str) -> Result<usize> {
        self.lookup
            .get(meaning)
            .copied()
            .ok_or_else(|| FlagError::unknown_meaning(meaning))
    }

    fn resolve<M: AsRef<str>>(&self, meanings: &[M], ignore_missing: bool) -> Result<Vec<usize>> {
        let mut slots = Vec::with_capacity(meanings.len());
        for meaning in meanings {
            let meaning: &str = meaning.as_ref();
            match self.lookup.get(meaning) {
                Some(&slot) => slots.push(slot),
                None if ignore_missing => {
                    log::debug!("Ignoring unknown flag meaning '{meaning}'");
                }
                None => return Err(FlagError::unknown_meaning(meaning)),
            }
        }
        Ok(slots)
    }

    fn is_fill(&self, raw: T) -> bool {
        self.fill_value == Some(raw)
    }

    fn test(&self, slot: usize, raw: T) -> bool {
        !self.is_fill(raw) && raw & self.masks[slot] == self.values[slot]
    }

    fn cleared(&self, raw: T, mask: T) -> T {
        if self.is_fill(raw) {
            T::ZERO
        } else {
            raw & !mask
        }
    }
}

fn raw_at<T, S, D, I>(flags: &ArrayBase<S, D>, index: I) -> Result<T>
where
    T: FlagInt,
    S: Data<Elem = T>,
    D: Dimension,
    I: NdIndex<D> + Clone + Debug,
{
    flags
        .get(index.clone())
        .copied()
        .ok_or_else(|| FlagError::index_out_of_bounds(&index))
}

fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis < 0 { axis + ndim as isize } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(FlagError::AxisOutOfBounds { axis, ndim });
    }
    Ok(resolved as usize)
}

fn find_exclusive_good<T: FlagInt>(values: &[T], masks: &[T]) -> Option<usize> {
    (0..values.len()).find(|&good| {
        values[good] == T::ZERO
            && (0..values.len()).filter(|&other| other != good).all(|other| {
                values[other] != T::ZERO && masks[other] & !masks[good] == T::ZERO
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array1};
    use pretty_assertions::assert_eq;

    fn exclusive() -> FlagRegistry<u8> {
        FlagRegistry::new(FlagSpec::new(
            ["good", "medium", "bad", "extra_bad"],
            vec![0, 1, 2, 3],
        ))
        .unwrap()
    }

    fn satellite() -> FlagRegistry<u8> {
        FlagRegistry::new(
            FlagSpec::new(["good", "temp_anomaly", "maneuver"], vec![0, 1, 2])
                .with_masks(vec![3, 1, 2]),
        )
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let registry = satellite();
        assert_eq!(registry.get_value_for_meaning("maneuver").unwrap(), 2);
        assert_eq!(registry.get_mask_for_meaning("good").unwrap(), 3);
        assert_eq!(
            registry.get_value_for_meaning("eclipse"),
            Err(FlagError::UnknownMeaning("eclipse".to_string()))
        );
        assert!(registry.get_mask_for_meaning("eclipse").is_err());
    }

    #[test]
    fn test_valid_meaning() {
        let registry = exclusive();
        for meaning in ["good", "medium", "bad", "extra_bad"] {
            assert!(registry.is_valid_meaning(meaning));
        }
        for meaning in ["test", "not", "valid", "good1", "extra"] {
            assert!(!registry.is_valid_meaning(meaning));
        }
    }

    #[test]
    fn test_default_masks() {
        let registry = exclusive();
        assert!(registry.has_default_masks());
        assert_eq!(registry.masks(), &[255, 255, 255, 255]);
        assert!(!satellite().has_default_masks());
    }

    #[test]
    fn test_flags_set_at_index_inclusive() {
        let registry = satellite();
        let flags = arr1(&[3u8, 0]);
        assert_eq!(
            registry.get_flags_set_at_index(&flags, 0).unwrap(),
            vec!["temp_anomaly", "maneuver"]
        );
        assert_eq!(registry.get_flags_set_at_index(&flags, 1).unwrap(), vec!["good"]);
    }

    #[test]
    fn test_get_flag_multiple_meanings() {
        let registry = satellite();
        let flags = arr1(&[0u8, 1, 2, 3]);
        let set = registry
            .get_flag(&flags, &["temp_anomaly", "maneuver"], false)
            .unwrap();
        assert_eq!(set, arr1(&[false, true, true, true]));
    }

    #[test]
    fn test_get_flag_unknown_meaning() {
        let registry = exclusive();
        let flags = arr1(&[0u8, 0, 1, 2, 3]);
        for meaning in ["test", "not", "valid", "good1", "extra"] {
            let set = registry.get_flag(&flags, &[meaning], true).unwrap();
            assert_eq!(set.iter().filter(|&&s| s).count(), 0);
            assert!(registry.get_flag(&flags, &[meaning], false).is_err());
        }
    }

    #[test]
    fn test_ignore_missing_keeps_known_meanings() {
        let registry = exclusive();
        let flags = arr1(&[0u8, 1, 2]);
        let set = registry
            .get_flag(&flags, &["dreams", "bad"], true)
            .unwrap();
        assert_eq!(set, arr1(&[false, false, true]));
    }

    #[test]
    fn test_fill_value_is_never_flagged() {
        let registry = FlagRegistry::new(
            FlagSpec::new(["good", "bad"], vec![0u8, 1]).with_fill_value(255),
        )
        .unwrap();
        let flags = arr1(&[0u8, 1, 255]);
        assert_eq!(registry.get_flag(&flags, &["good", "bad"], false).unwrap(), arr1(&[true, true, false]));
        assert!(!registry.get_flag_at_index(&flags, "good", 2).unwrap());
        assert!(registry.get_flags_set_at_index(&flags, 2).unwrap().is_empty());
    }

    #[test]
    fn test_index_out_of_bounds() {
        let registry = exclusive();
        let flags = arr1(&[0u8, 1]);
        assert!(matches!(
            registry.get_flag_at_index(&flags, "good", 2),
            Err(FlagError::IndexOutOfBounds(_))
        ));
        assert!(registry.get_flags_set_at_index(&flags, 5).is_err());
    }

    #[test]
    fn test_multidimensional_index() {
        let registry = satellite();
        let flags = arr2(&[[0u8, 1], [2, 3]]);
        assert!(registry.get_flag_at_index(&flags, "maneuver", (1, 0)).unwrap());
        assert!(registry.get_flag_at_index(&flags, "good", [0, 0]).unwrap());
        assert_eq!(
            registry.get_flags_set_at_index(&flags, (1, 1)).unwrap(),
            vec!["temp_anomaly", "maneuver"]
        );
    }

    #[test]
    fn test_find_flag() {
        let registry = satellite();
        let flags = arr1(&[0u8, 1, 2, 3]);
        let found = registry
            .find_flag(&flags, &["maneuver", "temp_anomaly"])
            .unwrap();
        assert_eq!(found, arr1(&[None, Some(1), Some(0), Some(0)]));
        assert_eq!(found.map(Option::is_some), arr1(&[false, true, true, true]));
        assert_eq!(
            registry.find_flag(&flags, &["maneuver", "eclipse"]),
            Err(FlagError::UnknownMeaning("eclipse".to_string()))
        );
    }

    #[test]
    fn test_first_known_flag() {
        let registry = exclusive();
        let flags = arr1(&[0u8, 0, 1, 2, 3]);
        let missing = ["thegrinch", "lochnessmonster", "dreams"];
        assert!(matches!(
            registry.first_known_flag(&flags, &missing),
            Err(FlagError::NoKnownMeaning(_))
        ));
        for meaning in registry.meanings() {
            let mut options: Vec<&str> = missing.to_vec();
            options.push(meaning);
            assert_eq!(
                registry.first_known_flag(&flags, &options).unwrap(),
                registry.get_flag(&flags, &[meaning], false).unwrap()
            );
        }
    }

    #[test]
    fn test_set_flag_at_index() {
        let registry = exclusive();
        let original = arr1(&[0u8, 0, 1, 2, 3, 255]);
        let mut flags = original.clone();

        registry.set_flag_at_index(&mut flags, "extra_bad", 0).unwrap();
        assert_eq!(
            registry.get_flag(&flags, &["extra_bad"], false).unwrap(),
            arr1(&[true, false, false, false, true, false])
        );

        registry.set_flag_at_index(&mut flags, "good", 0).unwrap();
        assert_eq!(flags, original);
    }

    #[test]
    fn test_set_flag_identity_when_nothing_selected() {
        let registry = exclusive();
        let original = arr1(&[0u8, 0, 1, 2, 3, 255]);
        let mut flags = original.clone();
        let nothing = Array1::from_elem(6, false);
        for meaning in ["good", "medium", "bad", "extra_bad"] {
            registry.set_flag(&mut flags, meaning, &nothing, false).unwrap();
            assert_eq!(flags, original);
        }
    }

    #[test]
    fn test_set_flag_zero_if_unset() {
        let registry = exclusive();
        let mut flags = arr1(&[0u8, 0, 1, 2, 3, 255]);
        let selection = arr1(&[true, true, false, false, false, false]);
        registry
            .set_flag(&mut flags, "extra_bad", &selection, true)
            .unwrap();
        assert_eq!(
            registry.get_flag(&flags, &["extra_bad"], false).unwrap(),
            selection
        );
        assert_eq!(
            registry.get_flag(&flags, &["good"], false).unwrap(),
            arr1(&[false, false, true, true, true, true])
        );
    }

    #[test]
    fn test_set_flag_shape_mismatch_writes_nothing() {
        let registry = exclusive();
        let mut flags = arr1(&[0u8, 1, 2]);
        let selection = arr1(&[true, true]);
        assert_eq!(
            registry.set_flag(&mut flags, "bad", &selection, false),
            Err(FlagError::SelectionShape {
                expected: vec![3],
                actual: vec![2],
            })
        );
        assert_eq!(flags, arr1(&[0u8, 1, 2]));
    }

    #[test]
    fn test_set_flag_at_indices() {
        let registry = exclusive();
        let mut flags = arr1(&[0u8, 0, 1, 2, 3]);
        registry
            .set_flag_at_indices(&mut flags, "medium", [0usize, 4], false)
            .unwrap();
        assert_eq!(flags, arr1(&[1u8, 0, 1, 2, 1]));

        assert!(matches!(
            registry.set_flag_at_indices(&mut flags, "bad", [1usize, 9], false),
            Err(FlagError::IndexOutOfBounds(_))
        ));
        assert_eq!(flags, arr1(&[1u8, 0, 1, 2, 1]));
    }

    #[test]
    fn test_set_unknown_meaning() {
        let registry = exclusive();
        let mut flags = arr1(&[0u8, 1]);
        assert!(registry.set_flag_at_index(&mut flags, "eclipse", 0).is_err());
        assert!(registry
            .set_flag(&mut flags, "eclipse", &arr1(&[true, true]), true)
            .is_err());
        assert_eq!(flags, arr1(&[0u8, 1]));
    }

    #[test]
    fn test_set_flag_overwrites_fill() {
        let registry = FlagRegistry::new(
            FlagSpec::new(["good", "medium", "bad", "extra_bad"], vec![0u8, 1, 2, 3])
                .with_fill_value(255),
        )
        .unwrap();
        let mut flags = Array1::from_elem(5, 255u8);

        registry
            .set_flag(&mut flags, "medium", &arr1(&[false, true, false, true, false]), false)
            .unwrap();
        assert_eq!(flags, arr1(&[255u8, 1, 255, 1, 255]));

        registry.set_flag_at_index(&mut flags, "extra_bad", 0).unwrap();
        assert_eq!(registry.get_flags_set_at_index(&flags, 0).unwrap(), vec!["extra_bad"]);

        registry
            .set_flag(&mut flags, "bad", &arr1(&[false, false, true, false, false]), true)
            .unwrap();
        assert_eq!(
            registry.get_flag(&flags, &["good"], false).unwrap(),
            arr1(&[true, true, false, true, true])
        );
    }

    #[test]
    fn test_exclusive_good_detection() {
        assert_eq!(exclusive().exclusive_good, Some(0));
        assert_eq!(satellite().exclusive_good, Some(0));

        let two_zero_values = FlagRegistry::new(
            FlagSpec::new(["good", "nominal", "bad"], vec![0u8, 0, 4]).with_masks(vec![7, 3, 4]),
        )
        .unwrap();
        assert_eq!(two_zero_values.exclusive_good, None);
        assert_eq!(two_zero_values.meanings_set_in(0), vec!["good", "nominal"]);
    }

    #[test]
    fn test_reduce_exclusion_drops_whole_sample() {
        let registry = FlagRegistry::new(
            FlagSpec::new(["a", "b", "c"], vec![1u8, 2, 4]).with_masks(vec![1, 2, 4]),
        )
        .unwrap();
        let flags = arr2(&[[1u8, 2, 4]]);
        assert_eq!(registry.reduce(&flags, 4, -1).unwrap(), arr1(&[3u8]));
        assert_eq!(registry.reduce(&flags, 0, -1).unwrap(), arr1(&[7u8]));
    }

    #[test]
    fn test_reduce_all_excluded_is_zero() {
        let registry = satellite();
        let flags = arr2(&[[1u8, 3], [2, 0]]);
        assert_eq!(registry.reduce(&flags, 1, 1).unwrap(), arr1(&[0u8, 2]));
    }

    #[test]
    fn test_reduce_ignores_fill() {
        let registry = FlagRegistry::new(
            FlagSpec::new(["good", "bad"], vec![0u8, 1]).with_fill_value(255),
        )
        .unwrap();
        let flags = arr2(&[[255u8, 1], [255, 255], [0, 255]]);
        assert_eq!(registry.reduce(&flags, 0, 1).unwrap(), arr1(&[1u8, 255, 0]));
    }

    #[test]
    fn test_reduce_axis_out_of_bounds() {
        let registry = satellite();
        let flags = arr2(&[[0u8, 1]]);
        assert_eq!(
            registry.reduce(&flags, 0, 2),
            Err(FlagError::AxisOutOfBounds { axis: 2, ndim: 2 })
        );
        assert!(registry.reduce(&flags, 0, -3).is_err());
    }

    #[test]
    fn test_to_spec_round_trip() {
        let registry = satellite();
        let rebuilt = FlagRegistry::new(registry.to_spec()).unwrap();
        assert_eq!(rebuilt.meanings(), registry.meanings());
        assert_eq!(rebuilt.values(), registry.values());
        assert_eq!(rebuilt.masks(), registry.masks());
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![("good", 0, 3), ("temp_anomaly", 1, 1), ("maneuver", 2, 2)]
        );
    }
}
