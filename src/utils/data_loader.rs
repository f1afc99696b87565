//! CSV loading and saving

use crate::error::{PredictorError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Rows sampled when inferring column dtypes
const INFER_SCHEMA_ROWS: usize = 1000;

/// CSV loader with the schema-inference settings used across the crate
pub struct DataLoader {
    infer_schema_length: Option<usize>,
    text_columns: Vec<String>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(INFER_SCHEMA_ROWS),
            text_columns: Vec::new(),
        }
    }

    /// Scan the whole file before fixing column dtypes
    pub fn with_full_schema_scan(mut self) -> Self {
        self.infer_schema_length = None;
        self
    }

    /// Read these columns as strings whatever their content looks like.
    /// Columns absent from the file are ignored.
    pub fn with_text_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    fn options(&self) -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
    }

    /// String overrides for the text columns present in the header
    fn text_overrides(&self, bytes: &[u8]) -> PolarsResult<Option<SchemaRef>> {
        if self.text_columns.is_empty() {
            return Ok(None);
        }

        let header = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_n_rows(Some(1))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        let schema: Schema = self
            .text_columns
            .iter()
            .filter(|name| header.get_column_index(name.as_str()).is_some())
            .map(|name| (PlSmallStr::from(name.as_str()), DataType::String))
            .collect();

        Ok((!schema.is_empty()).then(|| Arc::new(schema)))
    }

    fn read(&self, bytes: &[u8]) -> PolarsResult<DataFrame> {
        let overrides = self.text_overrides(bytes)?;
        self.options()
            .with_schema_overwrite(overrides)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
    }

    /// Load a CSV file from disk
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            PredictorError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        self.read(&bytes)
            .map_err(|e| PredictorError::DataError(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Parse CSV content held in memory, e.g. an uploaded file
    pub fn parse_csv(&self, bytes: &[u8]) -> Result<DataFrame> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(PredictorError::DataError("uploaded file is empty".to_string()));
        }

        self.read(bytes)
            .map_err(|e| PredictorError::DataError(format!("malformed CSV: {}", e)))
    }
}

/// CSV writer
pub struct DataSaver;

impl DataSaver {
    /// Serialize a frame as CSV with a header row
    pub fn to_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .finish(df)
            .map_err(|e| PredictorError::DataError(e.to_string()))?;
        Ok(buf)
    }

    /// Save to a CSV file
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| PredictorError::DataError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2.5,x").unwrap();
        writeln!(file, "4,5.0,y").unwrap();
        writeln!(file, "7,8.5,z").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("c").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_missing_file() {
        let result = DataLoader::new().load_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(PredictorError::DataError(_))));
    }

    #[test]
    fn test_full_scan_sees_late_decimals() {
        let mut csv = String::from("a\n");
        for _ in 0..INFER_SCHEMA_ROWS + 200 {
            csv.push_str("8\n");
        }
        csv.push_str("15.6\n");

        assert!(DataLoader::new().parse_csv(csv.as_bytes()).is_err());
        let df = DataLoader::new()
            .with_full_schema_scan()
            .parse_csv(csv.as_bytes())
            .unwrap();
        assert_eq!(df.height(), INFER_SCHEMA_ROWS + 201);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_text_columns_keep_digits_as_strings() {
        let csv = b"code,n\n007,1\n12,2\n";
        let df = DataLoader::new()
            .with_text_columns(["code", "absent"])
            .parse_csv(csv)
            .unwrap();

        assert_eq!(df.column("code").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("n").unwrap().dtype(), &DataType::Int64);
        let codes: Vec<&str> = df.column("code").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(codes, vec!["007", "12"]);
    }

    #[test]
    fn test_parse_empty_upload() {
        assert!(DataLoader::new().parse_csv(b"").is_err());
        assert!(DataLoader::new().parse_csv(b"  \n").is_err());
    }

    #[test]
    fn test_csv_bytes_roundtrip() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1i64, 2, 3]),
            Column::new("b".into(), &["x", "y", "z"]),
        ])
        .unwrap();

        let bytes = DataSaver::to_csv_bytes(&mut df).unwrap();
        let loaded = DataLoader::new().parse_csv(&bytes).unwrap();

        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
        assert!(String::from_utf8(bytes).unwrap().starts_with("a,b\n"));
    }

    #[test]
    fn test_save_csv() {
        let mut df = DataFrame::new(vec![Column::new("a".into(), &[1.5f64, 2.5])]).unwrap();
        let file = NamedTempFile::new().unwrap();
        DataSaver::save_csv(&mut df, file.path()).unwrap();

        let loaded = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(loaded.height(), 2);
    }
}
