use crate::error::{PcaError, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Explicit, caller-supplied mapping from category names to integer codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelEncoder {
    codes: BTreeMap<String, i64>,
}

impl LabelEncoder {
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        LabelEncoder {
            codes: pairs.into_iter().map(|(name, code)| (name.into(), code)).collect(),
        }
    }

    /// Assigns codes `1, 2, ...` to the categories in the order given. Repeated names
    /// keep their first code.
    pub fn from_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes = BTreeMap::new();
        for name in names {
            let next = codes.len() as i64 + 1;
            codes.entry(name.into()).or_insert(next);
        }
        LabelEncoder { codes }
    }

    pub fn encode(&self, name: &str) -> Result<i64> {
        self.codes
            .get(name)
            .copied()
            .ok_or_else(|| PcaError::invalid(format!("unknown category '{}'", name)))
    }

    pub fn encode_column<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<i64>> {
        names.iter().map(|n| self.encode(n.as_ref())).collect()
    }

    /// First category name mapped to `code`, in name order.
    pub fn decode(&self, code: i64) -> Option<&str> {
        self.codes
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Parses `name=code` pairs separated by commas, e.g. `setosa=1,versicolor=2`.
impl FromStr for LabelEncoder {
    type Err = PcaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut codes = BTreeMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, code) = pair
                .split_once('=')
                .ok_or_else(|| PcaError::invalid(format!("expected name=code, got '{}'", pair)))?;
            let code = code
                .trim()
                .parse::<i64>()
                .map_err(|e| PcaError::invalid(format!("bad code in '{}': {}", pair, e)))?;
            codes.insert(name.trim().to_string(), code);
        }
        Ok(LabelEncoder { codes })
    }
}
