//! Partitions of an index set by class label.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::dataset::Dataset;
use crate::error::DataError;
use crate::index::IndexSet;

/// Partition of dataset positions keyed by dense label index.
///
/// Iteration order over classes is the ascending label-index order, which
/// makes branch numbering deterministic. A map built by [`ByClassMap::group`]
/// never holds an empty class; maps assembled by a splitter may (a class of
/// the parent node whose branch received no member keeps an empty entry so
/// the class set stays well defined downstream).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByClassMap {
    classes: BTreeMap<usize, Vec<usize>>,
}

impl ByClassMap {
    /// Group the given positions of `dataset` by label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::IndexOutOfBounds`] | An index is past the dataset end |
    /// | [`DataError::MissingLabel`] | A referenced series carries no label |
    pub fn group(dataset: &Dataset, indices: &IndexSet) -> Result<Self, DataError> {
        let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in indices.iter() {
            let label = dataset.label_index(index)?;
            classes.entry(label).or_default().push(index);
        }
        Ok(Self { classes })
    }

    /// Assemble a map from parts, allowing empty per-class lists.
    #[must_use]
    pub fn from_parts(classes: BTreeMap<usize, Vec<usize>>) -> Self {
        Self { classes }
    }

    /// Return the number of classes (including empty entries).
    #[must_use]
    pub fn nb_classes(&self) -> usize {
        self.classes.len()
    }

    /// Return the total number of indices across classes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    /// Return true when at most one class holds members.
    #[must_use]
    pub fn is_pure(&self) -> bool {
        self.classes.values().filter(|v| !v.is_empty()).count() <= 1
    }

    /// Iterate `(label_index, members)` in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.classes.iter().map(|(&l, v)| (l, v.as_slice()))
    }

    /// Return the labels present (including labels with empty entries).
    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.classes.keys().copied()
    }

    /// Return the members of one class, if present.
    #[must_use]
    pub fn members(&self, label: usize) -> Option<&[usize]> {
        self.classes.get(&label).map(Vec::as_slice)
    }

    /// Map each label to its branch position in iteration order.
    #[must_use]
    pub fn labels_to_index(&self) -> BTreeMap<usize, usize> {
        self.classes
            .keys()
            .enumerate()
            .map(|(pos, &label)| (label, pos))
            .collect()
    }

    /// Flatten into an [`IndexSet`] over all members.
    #[must_use]
    pub fn to_index_set(&self) -> IndexSet {
        self.classes.values().flatten().copied().collect()
    }

    /// Pick one member per non-empty class, uniformly at random.
    ///
    /// Returns `(label_index, member)` pairs in ascending label order.
    #[must_use]
    pub fn pick_one_by_class<R: Rng>(&self, rng: &mut R) -> Vec<(usize, usize)> {
        self.classes
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(&label, members)| {
                let &pick = members.choose(rng).expect("non-empty by filter");
                (label, pick)
            })
            .collect()
    }

    /// Return the label of the dominant class (most members, lowest label on
    /// ties), or `None` for an empty map.
    #[must_use]
    pub fn majority_label(&self) -> Option<usize> {
        self.classes
            .iter()
            .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(a.0)))
            .map(|(&label, _)| label)
    }
}
