// src/table/recording.rs
//! In-memory multichannel recording keyed by a strictly increasing index

use crate::config::constants::channels;
use crate::error::{EmgError, EmgErrorBuilder, EmgResult};

/// Signal family of a channel column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFamily {
    /// `EMG_<n>` columns
    Emg,
    /// `FORCE_<n>` columns
    Force,
}

impl ChannelFamily {
    /// Column name prefix of the family
    pub fn prefix(&self) -> &'static str {
        match self {
            ChannelFamily::Emg => channels::EMG_PREFIX,
            ChannelFamily::Force => channels::FORCE_PREFIX,
        }
    }

    /// Channel id of `column` when it belongs to this family
    ///
    /// `EMG_12` yields `12`; `EMG_12_raw` or `EMG_` are not channels.
    pub fn channel_id<'a>(&self, column: &'a str) -> Option<&'a str> {
        column
            .strip_prefix(self.prefix())
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Borrowed channel of a [`Recording`]
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    /// Full column name
    pub name: &'a str,
    /// Digits after the family prefix
    pub id: &'a str,
    /// Column samples
    pub samples: &'a [f64],
}

/// Ordered named columns sharing one time index
#[derive(Debug, Clone, Default)]
pub struct Recording {
    index: Vec<i64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Recording {
    /// Empty recording over `index`, which must be strictly increasing
    pub fn new(index: Vec<i64>) -> EmgResult<Self> {
        if let Some(pos) = index.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(EmgErrorBuilder::new("recording", "new").invalid_data(
                "index",
                &format!(
                    "keys must be strictly increasing, found {} then {} at position {}",
                    index[pos],
                    index[pos + 1],
                    pos + 1
                ),
            ));
        }

        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Builder form of [`Recording::add_column`]
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> EmgResult<Self> {
        self.add_column(name, values)?;
        Ok(self)
    }

    /// Append a column of the same length as the index
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> EmgResult<()> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(EmgErrorBuilder::new("recording", "add_column").invalid_data(
                "column",
                &format!(
                    "'{}' has {} samples, the index has {}",
                    name,
                    values.len(),
                    self.index.len()
                ),
            ));
        }
        if self.column(&name).is_some() {
            return Err(EmgError::DuplicateColumn(name));
        }

        self.columns.push((name, values));
        Ok(())
    }

    /// Index keys, strictly increasing
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    /// Number of samples per column
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True for an empty index
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Samples of the named column
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Every channel of `family`, in column order
    pub fn channels(&self, family: ChannelFamily) -> Vec<Channel<'_>> {
        self.columns
            .iter()
            .filter_map(|(name, values)| {
                family.channel_id(name).map(|id| Channel {
                    name,
                    id,
                    samples: values,
                })
            })
            .collect()
    }

    /// Columns that are not signal channels
    ///
    /// Anything not starting with the EMG prefix is metadata; force-prefixed
    /// columns are dropped as well when `exclude_force` is set.
    pub fn metadata_columns(&self, exclude_force: bool) -> Vec<(&str, &[f64])> {
        self.columns
            .iter()
            .filter(|(name, _)| {
                !name.starts_with(channels::EMG_PREFIX)
                    && !(exclude_force && name.starts_with(channels::FORCE_PREFIX))
            })
            .map(|(name, values)| (name.as_str(), values.as_slice()))
            .collect()
    }

    /// Index keys at the given sample positions
    pub fn keys_at(&self, positions: &[usize]) -> EmgResult<Vec<i64>> {
        positions
            .iter()
            .map(|&p| {
                self.index.get(p).copied().ok_or_else(|| {
                    EmgErrorBuilder::new("recording", "keys_at")
                        .invalid_data("position", &format!("{} is outside {} samples", p, self.len()))
                })
            })
            .collect()
    }

    /// Value of `column` at index key `key`
    pub fn value_at(&self, key: i64, column: &str) -> Option<f64> {
        let position = self.index.binary_search(&key).ok()?;
        self.column(column).map(|values| values[position])
    }
}
