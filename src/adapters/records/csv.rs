//! CSV record source
//!
//! Reads a CRM export with a header row. Columns are looked up by name:
//! the id column is trimmed, grouping columns are kept exactly as written,
//! and the label is trimmed. A column missing from the header reads as an
//! empty string in every row.

use crate::adapters::traits::RecordSource;
use crate::config::InputConfig;
use crate::domain::{FerryError, Record, Result};
use std::path::{Path, PathBuf};

/// Records from a CSV file
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
    file_id_column: String,
    grouping_columns: Vec<String>,
    label_column: String,
}

impl CsvRecordSource {
    pub fn new(
        path: impl Into<PathBuf>,
        file_id_column: impl Into<String>,
        grouping_columns: Vec<String>,
        label_column: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_id_column: file_id_column.into(),
            grouping_columns,
            label_column: label_column.into(),
        }
    }

    /// Build from the `[input]` section
    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(
            &config.csv_path,
            &config.file_id_column,
            config.grouping_columns.clone(),
            &config.label_column,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<R: std::io::Read>(&self, reader: ::csv::Reader<R>) -> Result<Vec<Record>> {
        let mut reader = reader;
        let headers = reader
            .headers()
            .map_err(|e| self.input_error("failed to read header row", e))?
            .clone();

        let column = |name: &str| -> Option<usize> {
            let index = headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name);
            if index.is_none() {
                tracing::warn!(
                    path = %self.path.display(),
                    column = %name,
                    "Column not found, reading it as empty"
                );
            }
            index
        };

        let id_index = column(&self.file_id_column);
        let grouping_indices: Vec<Option<usize>> =
            self.grouping_columns.iter().map(|c| column(c)).collect();
        let label_index = column(&self.label_column);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let row_data = result.map_err(|e| self.input_error(&format!("row {}", row + 1), e))?;

            records.push(Record::new(
                field(&row_data, id_index).trim(),
                grouping_indices
                    .iter()
                    .map(|&i| field(&row_data, i).to_string())
                    .collect(),
                field(&row_data, label_index).trim(),
            ));
        }

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "Loaded input records"
        );
        Ok(records)
    }

    fn input_error(&self, context: &str, err: ::csv::Error) -> FerryError {
        FerryError::Input(format!("{}: {}: {}", self.path.display(), context, err))
    }
}

fn field(row: &::csv::StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

impl RecordSource for CsvRecordSource {
    fn load(&self) -> Result<Vec<Record>> {
        let reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.input_error("cannot open", e))?;
        self.read(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_for(contents: &str) -> (NamedTempFile, CsvRecordSource) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        let source = CsvRecordSource::from_config(&InputConfig {
            csv_path: file.path().to_string_lossy().to_string(),
            ..InputConfig::default()
        });
        (file, source)
    }

    #[test]
    fn test_load_default_columns() {
        let (_file, source) = source_for(
            "File_Id__s,Full_Name,Mailing_Street,Well_Id,Image Field\n\
             f1,Jane Doe,1 Main St,W-1,front\n\
             ,John Roe,2 Side St,W-2,back\n",
        );

        let records = source.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_file_id, "f1");
        assert_eq!(
            records[0].destination_key().as_str(),
            "Jane Doe_1 Main St_W-1"
        );
        assert_eq!(records[0].file_name().as_deref(), Some("front_f1.jpg"));
        assert!(records[1].source_id().is_none());
    }

    #[test]
    fn test_id_and_label_trimmed_grouping_verbatim() {
        let (_file, source) = source_for(
            "File_Id__s,Full_Name,Mailing_Street,Well_Id,Image Field\n\
             \" f1 \",Jane ,1 Main St, W-1,\" front \"\n",
        );

        let records = source.load().unwrap();
        assert_eq!(records[0].source_file_id, "f1");
        assert_eq!(records[0].label, "front");
        assert_eq!(records[0].grouping_fields, vec!["Jane ", "1 Main St", " W-1"]);
    }

    #[test]
    fn test_missing_column_reads_empty() {
        let (_file, source) = source_for("File_Id__s,Full_Name\nf1,Jane\n");

        let records = source.load().unwrap();
        assert_eq!(records[0].destination_key().as_str(), "Jane__");
        assert_eq!(records[0].label, "");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let source = CsvRecordSource::new("/nonexistent/updated.csv", "id", vec![], "label");
        assert!(matches!(source.load(), Err(FerryError::Input(_))));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let (_file, source) = source_for(
            "File_Id__s,Full_Name,Mailing_Street,Well_Id,Image Field\nf1,Jane\n",
        );
        let records = source.load().unwrap();
        assert_eq!(records[0].grouping_fields, vec!["Jane", "", ""]);
    }
}
