use std::collections::BTreeMap;

/// Inclusive range of changed line counts covered by a size label.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SizeRange {
    pub min: u64,
    #[serde(default = "unbounded")]
    pub max: u64,
}

fn unbounded() -> u64 {
    u64::MAX
}

impl SizeRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: u64) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

const DEFAULT_SIZES: [(&str, SizeRange); 6] = [
    ("size/XS", SizeRange::new(0, 9)),
    ("size/S", SizeRange::new(10, 29)),
    ("size/M", SizeRange::new(30, 99)),
    ("size/L", SizeRange::new(100, 499)),
    ("size/XL", SizeRange::new(500, 999)),
    ("size/XXL", SizeRange::new(1000, u64::MAX)),
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SizeTableError {
    #[error("size table does not contain any labels")]
    Empty,
    #[error("label {0:?} is defined more than once")]
    DuplicateLabel(String),
    #[error("label {label:?} has an empty range ({min} > {max})")]
    InvalidRange { label: String, min: u64, max: u64 },
    #[error("ranges of labels {first:?} and {second:?} overlap")]
    Overlap { first: String, second: String },
    #[error("cannot parse size table: {0}")]
    Parse(String),
}

/// Mapping from size labels to the changed line counts they cover.
///
/// Ranges are guaranteed to be non-empty and disjoint, so at most one label matches any count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTable {
    // Sorted by the lower bound of the range.
    entries: Vec<(String, SizeRange)>,
}

impl SizeTable {
    pub fn new<L: Into<String>>(
        entries: impl IntoIterator<Item = (L, SizeRange)>,
    ) -> Result<Self, SizeTableError> {
        let mut entries: Vec<(String, SizeRange)> = entries
            .into_iter()
            .map(|(label, range)| (label.into(), range))
            .collect();
        if entries.is_empty() {
            return Err(SizeTableError::Empty);
        }

        entries.sort_by(|(a_label, a), (b_label, b)| {
            a.min.cmp(&b.min).then_with(|| a_label.cmp(b_label))
        });

        for (label, range) in &entries {
            if range.min > range.max {
                return Err(SizeTableError::InvalidRange {
                    label: label.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }
        for (index, (label, _)) in entries.iter().enumerate() {
            if entries[..index].iter().any(|(other, _)| other == label) {
                return Err(SizeTableError::DuplicateLabel(label.clone()));
            }
        }
        // With entries sorted by `min`, any overlap also shows up between neighbours.
        for pair in entries.windows(2) {
            let ((first, a), (second, b)) = (&pair[0], &pair[1]);
            if a.max >= b.min {
                return Err(SizeTableError::Overlap {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Parses a table from TOML:
    ///
    /// ```toml
    /// [sizes]
    /// "size/S" = { min = 0, max = 49 }
    /// "size/L" = { min = 50 }
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, SizeTableError> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct SizeTableFile {
            sizes: BTreeMap<String, SizeRange>,
        }

        let file: SizeTableFile =
            toml::from_str(text).map_err(|error| SizeTableError::Parse(error.to_string()))?;
        Self::new(file.sizes)
    }

    /// Returns the label whose range contains `count`, if any.
    pub fn classify(&self, count: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, range)| range.contains(count))
            .map(|(label, _)| label.as_str())
    }

    /// All labels of the table, ordered by their ranges.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SIZES
                .iter()
                .map(|(label, range)| (label.to_string(), *range))
                .collect(),
        }
    }
}
