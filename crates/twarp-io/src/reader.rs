//! CSV signal reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use twarp_cow::SignalMatrix;

use crate::IoError;
use crate::domain::{SignalDataset, SignalId};

/// Reads a signal matrix from a CSV file.
///
/// Expected CSV format:
/// - Header row required; the first column holds the signal id, the remaining
///   columns are positional samples
/// - `id,x0,x1,...,xn`
/// - One row per signal, all rows with the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | No data rows, or no sample columns |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::DuplicateSignalId`] | Same id appears twice |
pub struct SignalReader {
    path: PathBuf,
}

impl SignalReader {
    /// Create a reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    /// Read and validate the CSV file, returning a [`SignalDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SignalDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so short rows surface as InconsistentRowLength.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let expected_cols = rdr.headers().map_err(|e| self.parse_error(e))?.len();
        debug!(expected_cols, "read CSV header");
        if expected_cols < 2 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let mut ids = Vec::new();
        let mut rows = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            let signal_id = record.get(0).unwrap_or("").to_string();

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    signal_id,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            if let Some(&first_row) = seen.get(&signal_id) {
                return Err(IoError::DuplicateSignalId {
                    path: self.path.clone(),
                    signal_id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(signal_id.clone(), row_index);

            let values = record
                .iter()
                .skip(1)
                .enumerate()
                .map(|(col_index, raw)| {
                    raw.trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| IoError::NonFiniteValue {
                            path: self.path.clone(),
                            row_index,
                            col_index,
                            raw: raw.to_string(),
                        })
                })
                .collect::<Result<Vec<f64>, IoError>>()?;

            ids.push(SignalId::new(signal_id));
            rows.push(values);
        }

        if ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        // Rows are already checked for length and finiteness.
        let signals = SignalMatrix::new(rows).map_err(|_| IoError::EmptyDataset {
            path: self.path.clone(),
        })?;

        info!(
            n_signals = signals.n_rows(),
            n_points = signals.n_cols(),
            "dataset loaded"
        );

        Ok(SignalDataset { ids, signals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_matrix() {
        let csv = "id,x0,x1,x2\ns1,0.0,1.0,0.5\ns2,0.1,0.9,0.4\ns3,0.2,0.8,0.3\n";
        let f = write_csv(csv);
        let ds = SignalReader::new(f.path()).read().unwrap();
        assert_eq!(ds.ids.len(), 3);
        assert_eq!(ds.signals.n_rows(), 3);
        assert_eq!(ds.signals.n_cols(), 3);
        assert_eq!(ds.ids[2].as_str(), "s3");
        assert_eq!(ds.signals.row(1), &[0.1, 0.9, 0.4]);
    }

    #[test]
    fn file_order_preserved() {
        let csv = "id,x0\nzz,1.0\naa,2.0\nmm,3.0\n";
        let f = write_csv(csv);
        let ds = SignalReader::new(f.path()).read().unwrap();
        let ids: Vec<&str> = ds.ids.iter().map(SignalId::as_str).collect();
        assert_eq!(ids, vec!["zz", "aa", "mm"]);
        assert_eq!(ds.signals.column(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn error_file_not_found() {
        let result = SignalReader::new(Path::new("/nonexistent/signals.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("id,x0,x1\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_no_sample_columns() {
        let f = write_csv("id\na\nb\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("id,x0,x1,x2\na,1.0,2.0,3.0\nb,1.0,2.0\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, got: 3, .. })
        ));
    }

    #[test]
    fn error_non_finite_values() {
        for bad in ["NaN", "inf", "-Inf", "abc", ""] {
            let f = write_csv(&format!("id,x0,x1\na,1.0,{bad}\n"));
            let result = SignalReader::new(f.path()).read();
            assert!(
                matches!(result, Err(IoError::NonFiniteValue { col_index: 1, .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn error_duplicate_signal_id() {
        let f = write_csv("id,x0\na,1.0\nb,2.0\na,3.0\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateSignalId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }
}
