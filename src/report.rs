//! Delimited-text output for dependency exports.

use std::io::Write;
use std::path::Path;

use crate::client::DtClient;
use crate::error::Result;
use crate::export::{export_all, DependencyRecord, ExportOptions};

/// CSV sink for [`DependencyRecord`]s.
///
/// The header row is written with the first record; an export without
/// records produces an empty file.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CsvReport<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(output),
            rows: 0,
        }
    }

    pub fn write(&mut self, record: &DependencyRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()).into())
    }
}

/// Write `records` as CSV into `output`.
pub fn write_csv<W: Write>(output: W, records: &[DependencyRecord]) -> Result<W> {
    let mut report = CsvReport::new(output);
    for record in records {
        report.write(record)?;
    }
    report.finish()
}

/// Run a full export and write it to `path`. Returns the number of rows.
#[tracing::instrument(skip(client, options))]
pub async fn export_to_file(
    client: &DtClient,
    options: &ExportOptions,
    path: &Path,
) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let mut report = CsvReport::new(std::io::BufWriter::new(file));

    export_all(client, options, |record| report.write(&record)).await?;

    let rows = report.rows();
    report.finish()?;
    tracing::info!(rows, path = %path.display(), "report written");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::RECORD_COLUMNS;

    fn record(dependency_url: Option<&str>) -> DependencyRecord {
        DependencyRecord {
            project_name: "app".to_string(),
            project_version: Some("1.0".to_string()),
            project_type: Some("APPLICATION".to_string()),
            project_group: None,
            project_description: Some("An app, with a comma".to_string()),
            project_last_import: Some("1700000000000".to_string()),
            project_scm: None,
            project_uuid: "u-1".to_string(),
            dependency_url: dependency_url.map(str::to_string),
            dependency_classifier: Some("LIBRARY".to_string()),
        }
    }

    #[test]
    fn test_header_matches_record_columns() {
        let out = write_csv(Vec::new(), &[record(Some("pkg:maven/a/b@1"))]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, RECORD_COLUMNS.join(","));
    }

    #[test]
    fn test_rows_quote_and_leave_nulls_empty() {
        let out = write_csv(Vec::new(), &[record(Some("pkg:maven/a/b@1")), record(None)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "app,1.0,APPLICATION,,\"An app, with a comma\",1700000000000,,u-1,pkg:maven/a/b@1,LIBRARY"
        );
        assert!(lines[2].ends_with("u-1,,LIBRARY"));
    }

    #[test]
    fn test_empty_export_writes_nothing() {
        let out = write_csv(Vec::new(), &[]).unwrap();
        assert!(out.is_empty());
    }
}
