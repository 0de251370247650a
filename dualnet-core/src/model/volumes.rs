//! Per-edge traffic volume counters.
//!
//! Counters are atomic so that simulation workers can increment them through
//! shared references to an otherwise immutable network. Workers that prefer
//! to avoid contention accumulate into a [`VolumeBatch`] and merge it at the
//! end of a tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use crate::{EdgeId, Error, Volume};

/// Fixed set of volume category names shared by every edge of a graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeCategories {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl VolumeCategories {
    /// Declares the category key set. Duplicate names are rejected.
    pub fn new<I, S>(names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories = Self::default();
        for name in names {
            let name = name.into();
            if categories.index.contains_key(&name) {
                return Err(Error::InvalidData(format!(
                    "Duplicate volume category: {name}"
                )));
            }
            categories.index.insert(name.clone(), categories.names.len());
            categories.names.push(name);
        }
        Ok(categories)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Slot of a category in every counter array
    pub fn position(&self, category: &str) -> Result<usize, Error> {
        self.index
            .get(category)
            .copied()
            .ok_or_else(|| Error::UnknownVolumeCategory(category.to_string()))
    }
}

/// Counters of a single edge, one per category
#[derive(Debug)]
pub struct VolumeCounters {
    categories: Arc<VolumeCategories>,
    values: Box<[AtomicU64]>,
}

impl VolumeCounters {
    pub fn new(categories: Arc<VolumeCategories>) -> Self {
        let values = (0..categories.len()).map(|_| AtomicU64::new(0)).collect();
        Self { categories, values }
    }

    pub fn categories(&self) -> &VolumeCategories {
        &self.categories
    }

    /// Adds `amount` and returns the new value.
    ///
    /// An increment past `Volume::MAX` fails and leaves the counter as it was.
    pub fn increment(&self, category: &str, amount: Volume) -> Result<Volume, Error> {
        let slot = self.categories.position(category)?;
        self.increment_slot(slot, amount)
    }

    pub(crate) fn increment_slot(&self, slot: usize, amount: Volume) -> Result<Volume, Error> {
        self.values[slot]
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
                value.checked_add(amount)
            })
            .map(|previous| previous + amount)
            .map_err(|_| overflow(&self.categories.names[slot]))
    }

    /// Whether adding `amount` to a slot would still fit
    pub(crate) fn has_room(&self, slot: usize, amount: Volume) -> bool {
        self.values[slot]
            .load(Ordering::Relaxed)
            .checked_add(amount)
            .is_some()
    }

    pub fn get(&self, category: &str) -> Result<Volume, Error> {
        let slot = self.categories.position(category)?;
        Ok(self.values[slot].load(Ordering::Relaxed))
    }

    /// Zeroes every counter; the key set is left untouched
    pub fn reset(&self) {
        for value in &self.values {
            value.store(0, Ordering::Relaxed);
        }
    }

    /// Current `(category, value)` pairs in declaration order
    pub fn snapshot(&self) -> Vec<(&str, Volume)> {
        self.categories
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.as_str(), value.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Worker-local volume accumulator.
///
/// Validates categories on [`record`](Self::record) so that merging into the
/// shared counters cannot fail on an unknown key.
#[derive(Debug, Clone)]
pub struct VolumeBatch {
    categories: Arc<VolumeCategories>,
    pub(crate) totals: HashMap<(EdgeId, usize), Volume>,
}

impl VolumeBatch {
    pub fn new(categories: Arc<VolumeCategories>) -> Self {
        Self {
            categories,
            totals: HashMap::new(),
        }
    }

    pub fn record(&mut self, edge: EdgeId, category: &str, amount: Volume) -> Result<(), Error> {
        let slot = self.categories.position(category)?;
        let total = self.totals.entry((edge, slot)).or_insert(0);
        *total = total
            .checked_add(amount)
            .ok_or_else(|| overflow(category))?;
        Ok(())
    }

    /// Folds another batch into this one, usable as a rayon reduce step.
    ///
    /// Totals saturate at `Volume::MAX`; merging such a batch into the
    /// network then fails instead of wrapping.
    pub fn merge(mut self, other: VolumeBatch) -> VolumeBatch {
        for (key, amount) in other.totals {
            let total = self.totals.entry(key).or_insert(0);
            *total = total.saturating_add(amount);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn categories(&self) -> &Arc<VolumeCategories> {
        &self.categories
    }
}

fn overflow(category: &str) -> Error {
    Error::InvalidData(format!("Volume overflow in category {category}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Arc<VolumeCategories> {
        Arc::new(VolumeCategories::new(["pedestrian", "cyclist"]).unwrap())
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        assert!(matches!(
            VolumeCategories::new(["car", "car"]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn reset_keeps_keys() {
        let counters = VolumeCounters::new(categories());
        assert_eq!(counters.increment("pedestrian", 3), Ok(3));
        assert_eq!(counters.increment("pedestrian", 2), Ok(5));
        assert_eq!(counters.increment("cyclist", 1), Ok(1));

        counters.reset();
        counters.reset();

        assert_eq!(counters.snapshot(), vec![("pedestrian", 0), ("cyclist", 0)]);
    }

    #[test]
    fn unknown_category_fails() {
        let counters = VolumeCounters::new(categories());
        assert_eq!(
            counters.increment("bus", 1),
            Err(Error::UnknownVolumeCategory("bus".to_string()))
        );

        let mut batch = VolumeBatch::new(categories());
        assert!(batch.record(0, "bus", 1).is_err());
        assert!(batch.is_empty());
    }

    #[test]
    fn batches_merge_by_edge_and_category() {
        let mut a = VolumeBatch::new(categories());
        a.record(0, "pedestrian", 2).unwrap();
        a.record(1, "cyclist", 1).unwrap();
        let mut b = VolumeBatch::new(categories());
        b.record(0, "pedestrian", 5).unwrap();

        let merged = a.merge(b);
        assert_eq!(merged.totals[&(0, 0)], 7);
        assert_eq!(merged.totals[&(1, 1)], 1);
    }

    #[test]
    fn counter_refuses_to_wrap() {
        let counters = VolumeCounters::new(categories());
        assert_eq!(counters.increment("cyclist", u64::MAX - 1), Ok(u64::MAX - 1));
        assert_eq!(counters.increment("cyclist", 1), Ok(u64::MAX));
        assert!(matches!(
            counters.increment("cyclist", 1),
            Err(Error::InvalidData(_))
        ));
        assert_eq!(counters.get("cyclist"), Ok(u64::MAX));
        assert_eq!(counters.get("pedestrian"), Ok(0));
    }

    #[test]
    fn batch_totals_do_not_wrap() {
        let mut a = VolumeBatch::new(categories());
        a.record(0, "pedestrian", u64::MAX).unwrap();
        assert!(matches!(
            a.record(0, "pedestrian", 1),
            Err(Error::InvalidData(_))
        ));
        assert_eq!(a.totals[&(0, 0)], u64::MAX);

        let mut b = VolumeBatch::new(categories());
        b.record(0, "pedestrian", 10).unwrap();
        assert_eq!(a.merge(b).totals[&(0, 0)], u64::MAX);
    }
}
