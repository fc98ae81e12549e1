//! File-based result writer

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::{ReportError, ResultSink, ResultSummary};
use crate::collector::PanoramaRecord;
use crate::link::DEFAULT_LINK_DOMAIN;
use crate::scan::ScanStatistics;

/// Columns of the detail report, in order.
pub const DETAIL_COLUMNS: [&str; 8] = [
    "panorama_id",
    "latitude",
    "longitude",
    "capture_date",
    "distance_from_origin_m",
    "origin_point",
    "discovered_at",
    "link",
];

/// Placeholder for records without a capture date.
const UNKNOWN_DATE: &str = "Unknown";

/// Writes links, the detail report and an optional JSON export.
///
/// All paths derive from the link file path: `links.txt` produces
/// `links_details.csv` and `links.json` next to it.
#[derive(Debug, Clone)]
pub struct FileResultWriter {
    links_path: PathBuf,
    link_domain: String,
    json: bool,
}

impl FileResultWriter {
    /// Creates a writer for the given link file.
    pub fn new(links_path: impl Into<PathBuf>) -> Self {
        Self {
            links_path: links_path.into(),
            link_domain: DEFAULT_LINK_DOMAIN.to_string(),
            json: false,
        }
    }

    /// Sets the Maps domain used in links.
    pub fn with_link_domain(mut self, domain: impl Into<String>) -> Self {
        self.link_domain = domain.into();
        self
    }

    /// Enables the JSON export.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn links_path(&self) -> &Path {
        &self.links_path
    }

    /// Path of the detail report.
    pub fn details_path(&self) -> PathBuf {
        self.sibling("_details.csv")
    }

    /// Path of the JSON export.
    pub fn json_path(&self) -> PathBuf {
        self.sibling(".json")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let stem = self
            .links_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "panoramas".to_string());
        self.links_path.with_file_name(format!("{stem}{suffix}"))
    }

    fn write_links(&self, records: &[PanoramaRecord]) -> Result<(), ReportError> {
        let io_err = |source: std::io::Error| ReportError::Io {
            path: self.links_path.clone(),
            source,
        };

        let mut out = BufWriter::new(File::create(&self.links_path).map_err(io_err)?);
        for record in records {
            writeln!(out, "{}", record.link(&self.link_domain)).map_err(io_err)?;
        }
        out.flush().map_err(io_err)
    }

    fn write_details(&self, records: &[PanoramaRecord], path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(DETAIL_COLUMNS)?;

        for record in records {
            writer.write_record([
                record.panorama_id.clone(),
                format!("{:.10}", record.exact_lat),
                format!("{:.10}", record.exact_lng),
                record.capture_date.clone().unwrap_or_else(|| UNKNOWN_DATE.to_string()),
                format!("{:.1}", record.distance_from_origin_m),
                record.origin_point.to_string(),
                record.discovered_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
                record.link(&self.link_domain),
            ])?;
        }

        writer.flush().map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_json(
        &self,
        records: &[PanoramaRecord],
        stats: &ScanStatistics,
        path: &Path,
    ) -> Result<(), ReportError> {
        #[derive(Serialize)]
        struct JsonPanorama<'a> {
            #[serde(flatten)]
            record: &'a PanoramaRecord,
            link: String,
        }

        #[derive(Serialize)]
        struct JsonExport<'a> {
            statistics: &'a ScanStatistics,
            panoramas: Vec<JsonPanorama<'a>>,
        }

        let export = JsonExport {
            statistics: stats,
            panoramas: records
                .iter()
                .map(|record| JsonPanorama {
                    record,
                    link: record.link(&self.link_domain),
                })
                .collect(),
        };

        let io_err = |source: std::io::Error| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut out, &export)?;
        out.flush().map_err(io_err)
    }
}

impl ResultSink for FileResultWriter {
    fn write_results(
        &self,
        records: &[PanoramaRecord],
        stats: &ScanStatistics,
    ) -> Result<Option<ResultSummary>, ReportError> {
        if records.is_empty() {
            return Ok(None);
        }

        if let Some(parent) = self.links_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut summary = ResultSummary::from_records(records);

        self.write_links(records)?;
        summary.files.push(self.links_path.clone());

        let details_path = self.details_path();
        self.write_details(records, &details_path)?;
        summary.files.push(details_path);

        if self.json {
            let json_path = self.json_path();
            self.write_json(records, stats, &json_path)?;
            summary.files.push(json_path);
        }

        info!(
            records = summary.records,
            links = %self.links_path.display(),
            "Results written"
        );
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridPoint;
    use crate::probe::PanoramaHit;
    use crate::scan::CompletionKind;
    use tempfile::TempDir;

    fn record(id: &str) -> PanoramaRecord {
        PanoramaRecord::from_hit(
            PanoramaHit {
                panorama_id: id.to_string(),
                lat: 61.665,
                lng: 50.835,
                capture_date: Some("2022-07".to_string()),
                attribution: Some("© Google".to_string()),
            },
            GridPoint::new(61.66, 50.83),
        )
    }

    fn stats(found: usize) -> ScanStatistics {
        ScanStatistics {
            points_checked: 1,
            found_count: found,
            efficiency_ratio: found as f64,
            request_count: 1,
            elapsed_seconds: 0.5,
            not_found: 0,
            rate_limited: 0,
            transport_failures: 0,
            duplicates: 0,
            total_grid_points: 1,
            truncated: false,
            completion: CompletionKind::Exhausted,
            output: None,
        }
    }

    #[test]
    fn test_derived_paths() {
        let writer = FileResultWriter::new("/tmp/out/syktyvkar_panoramas.txt");
        assert_eq!(
            writer.details_path(),
            PathBuf::from("/tmp/out/syktyvkar_panoramas_details.csv")
        );
        assert_eq!(writer.json_path(), PathBuf::from("/tmp/out/syktyvkar_panoramas.json"));
    }

    #[test]
    fn test_empty_records_create_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = FileResultWriter::new(dir.path().join("sub").join("links.txt")).with_json(true);

        let summary = writer.write_results(&[], &stats(0)).unwrap();

        assert!(summary.is_none());
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn test_writes_links_in_order() {
        let dir = TempDir::new().unwrap();
        let writer = FileResultWriter::new(dir.path().join("links.txt"));
        let records = vec![record("B"), record("A")];

        let summary = writer.write_results(&records, &stats(2)).unwrap().unwrap();

        let links = fs::read_to_string(dir.path().join("links.txt")).unwrap();
        let lines: Vec<_> = links.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("!1sB!"));
        assert!(lines[1].contains("!1sA!"));
        assert!(lines[0].starts_with("https://www.google.de/maps/@61.6650000000,50.8350000000,"));
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_detail_report_columns() {
        let dir = TempDir::new().unwrap();
        let writer = FileResultWriter::new(dir.path().join("links.txt")).with_link_domain("google.com");

        writer.write_results(&[record("X")], &stats(1)).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("links_details.csv")).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, DETAIL_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "X");
        assert_eq!(&rows[0][1], "61.6650000000");
        assert_eq!(&rows[0][2], "50.8350000000");
        assert_eq!(&rows[0][3], "2022-07");
        assert_eq!(&rows[0][5], "61.66000,50.83000");
        assert!(rows[0][7].starts_with("https://www.google.com/maps/@"));
    }

    #[test]
    fn test_missing_date_written_as_unknown() {
        let dir = TempDir::new().unwrap();
        let writer = FileResultWriter::new(dir.path().join("links.txt"));
        let mut undated = record("X");
        undated.capture_date = None;

        writer.write_results(&[undated], &stats(1)).unwrap();

        let mut reader = csv::Reader::from_path(writer.details_path()).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[3], "Unknown");
    }

    #[test]
    fn test_json_export() {
        let dir = TempDir::new().unwrap();
        let writer = FileResultWriter::new(dir.path().join("links.txt")).with_json(true);

        let summary = writer.write_results(&[record("X")], &stats(1)).unwrap().unwrap();
        assert_eq!(summary.files.len(), 3);

        let raw = fs::read_to_string(dir.path().join("links.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["statistics"]["found_count"], 1);
        assert_eq!(doc["statistics"]["completion"], "exhausted");
        assert_eq!(doc["panoramas"][0]["panorama_id"], "X");
        assert_eq!(doc["panoramas"][0]["origin_point"], "61.66000,50.83000");
        assert!(doc["panoramas"][0]["link"].as_str().unwrap().contains("!1sX!"));
    }

    #[test]
    fn test_creates_output_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results").join("links.txt");
        let writer = FileResultWriter::new(&path);

        writer.write_results(&[record("X")], &stats(1)).unwrap();
        assert!(path.exists());
    }
}
