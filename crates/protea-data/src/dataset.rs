//! Immutable, reference-counted datasets with named transforms.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::DataError;
use crate::series::Series;
use crate::transform::Transform;

/// Summary of a dataset: size, length bounds, and the label universe.
///
/// Label indices are dense in `[0, nb_labels)`, assigned by sorting the
/// distinct labels, so two datasets over the same label set agree on the
/// encoding.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatasetHeader {
    size: usize,
    dim: usize,
    length_min: usize,
    length_max: usize,
    labels: Vec<String>,
    label_to_index: BTreeMap<String, usize>,
}

impl DatasetHeader {
    fn build(series: &[Series]) -> Self {
        let mut length_min = usize::MAX;
        let mut length_max = 0;
        let mut labels: Vec<String> = Vec::new();
        for s in series {
            length_min = length_min.min(s.length());
            length_max = length_max.max(s.length());
            if let Some(l) = s.label()
                && !labels.iter().any(|known| known == l)
            {
                labels.push(l.to_string());
            }
        }
        labels.sort_unstable();
        let label_to_index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self {
            size: series.len(),
            dim: series[0].dim(),
            length_min,
            length_max,
            labels,
            label_to_index,
        }
    }

    /// Return the number of series.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Return the shared dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the shortest series length.
    #[must_use]
    pub fn length_min(&self) -> usize {
        self.length_min
    }

    /// Return the longest series length.
    #[must_use]
    pub fn length_max(&self) -> usize {
        self.length_max
    }

    /// Return the sorted distinct labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn nb_labels(&self) -> usize {
        self.labels.len()
    }

    /// Return the dense index of a label, if known.
    #[must_use]
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.label_to_index.get(label).copied()
    }
}

struct Inner {
    transform: String,
    series: Vec<Series>,
    header: Arc<DatasetHeader>,
}

/// Ordered collection of same-dimensionality series.
///
/// Cloning is cheap: the payload sits behind an `Arc` and is shared
/// read-only across threads. A derived dataset produced by
/// [`Dataset::transform`] shares the header (same size, labels, and
/// encoding) but owns its transformed payload, forming a chain of
/// immutable transform nodes.
#[derive(Clone)]
pub struct Dataset {
    inner: Arc<Inner>,
}

impl Dataset {
    /// Build a dataset from series, validating shared dimensionality.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyDataset`] | `series` is empty |
    /// | [`DataError::DimensionMismatch`] | Series disagree on dimensionality |
    pub fn new(series: Vec<Series>) -> Result<Self, DataError> {
        if series.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        let expected = series[0].dim();
        for (index, s) in series.iter().enumerate() {
            if s.dim() != expected {
                return Err(DataError::DimensionMismatch {
                    expected,
                    got: s.dim(),
                    index,
                });
            }
        }
        let header = Arc::new(DatasetHeader::build(&series));
        Ok(Self {
            inner: Arc::new(Inner {
                transform: Transform::Raw.name().to_string(),
                series,
                header,
            }),
        })
    }

    /// Return the header.
    #[must_use]
    pub fn header(&self) -> &DatasetHeader {
        &self.inner.header
    }

    /// Return the number of series.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.series.len()
    }

    /// Return the series at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= size()`; positions come from an [`crate::IndexSet`]
    /// over this dataset and are in bounds by construction.
    #[must_use]
    pub fn series(&self, index: usize) -> &Series {
        &self.inner.series[index]
    }

    /// Return the dense label index of the series at `index`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::IndexOutOfBounds`] | `index >= size()` |
    /// | [`DataError::MissingLabel`] | The series carries no label |
    pub fn label_index(&self, index: usize) -> Result<usize, DataError> {
        let size = self.size();
        let s = self
            .inner
            .series
            .get(index)
            .ok_or(DataError::IndexOutOfBounds { index, size })?;
        let label = s.label().ok_or(DataError::MissingLabel { index })?;
        self.inner
            .header
            .label_index(label)
            .ok_or(DataError::MissingLabel { index })
    }

    /// Return the name of the transform this dataset was produced by
    /// (`"raw"` for a freshly constructed dataset).
    #[must_use]
    pub fn transform_name(&self) -> &str {
        &self.inner.transform
    }

    /// Derive a dataset by applying a named transform to every series.
    ///
    /// The derived dataset shares this dataset's header: size, labels, and
    /// label encoding are preserved, so index sets and class partitions
    /// remain valid across transforms.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::UnknownTransform`] | `name` is not a registered transform |
    pub fn transform(&self, name: &str) -> Result<Dataset, DataError> {
        let transform = Transform::from_name(name)?;
        if matches!(transform, Transform::Raw) && self.inner.transform == Transform::Raw.name() {
            return Ok(self.clone());
        }
        let series = self
            .inner
            .series
            .iter()
            .map(|s| transform.apply(s))
            .collect();
        Ok(Self {
            inner: Arc::new(Inner {
                transform: transform.name().to_string(),
                series,
                header: Arc::clone(&self.inner.header),
            }),
        })
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("transform", &self.inner.transform)
            .field("size", &self.size())
            .field("dim", &self.header().dim())
            .finish()
    }
}
