//! Output document writing

use crate::output::encoder::encode_records;
use crate::output::{OutputError, OutputResult};
use crate::record::Record;
use std::path::Path;

/// Encodes `records` and writes the document to `output_path`
///
/// # Arguments
///
/// * `records` - Records in discovery order
/// * `category_label` - Top-level key of the document
/// * `output_path` - Where the UTF-8 document is written
///
/// # Returns
///
/// * `Ok(())` - Document written
/// * `Err(OutputError)` - The file could not be written
pub fn write_json_document(
    records: &[Record],
    category_label: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let document = encode_records(records, category_label);

    std::fs::write(output_path, document).map_err(|source| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Saved {} records to {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HarvestError;
    use tempfile::TempDir;

    #[test]
    fn test_write_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("maliki_questions.json");
        let records = vec![Record {
            title: "Q".to_string(),
            answer: "A".to_string(),
            source_link: "S".to_string(),
        }];

        write_json_document(&records, "Maliki", &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, encode_records(&records, "Maliki"));
    }

    #[test]
    fn test_write_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");

        write_json_document(&[], "Maliki", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"Maliki": []}"#);
    }

    #[test]
    fn test_write_failure_maps_to_output_write_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err: HarvestError = write_json_document(&[], "Maliki", &path).unwrap_err().into();
        assert!(matches!(err, HarvestError::OutputWriteFailed { .. }));
    }
}
