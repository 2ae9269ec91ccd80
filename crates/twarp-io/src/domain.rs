//! Domain types for twarp-io.

use twarp_cow::SignalMatrix;

use crate::IoError;

/// A signal identifier, parsed from the first column of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalId(String);

impl SignalId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    /// Return the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signals read from one CSV file. `ids[i]` labels row `i` of `signals`.
#[derive(Debug)]
pub struct SignalDataset {
    /// Signal identifiers in file order.
    pub ids: Vec<SignalId>,
    /// One row per signal, all of the same length.
    pub signals: SignalMatrix,
}

impl SignalDataset {
    /// Return the row index of the signal called `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("run-2024_a".to_string());
        assert_eq!(name.unwrap().as_str(), "run-2024_a");
    }

    #[test]
    fn experiment_name_rejects_empty() {
        let name = ExperimentName::new(String::new());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_rejects_path_separators() {
        let name = ExperimentName::new("../out".to_string());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn position_finds_row() {
        let ds = SignalDataset {
            ids: vec![SignalId::new("a".into()), SignalId::new("b".into())],
            signals: SignalMatrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(),
        };
        assert_eq!(ds.position("b"), Some(1));
        assert_eq!(ds.position("c"), None);
    }
}
