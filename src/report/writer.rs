//! ReportWriter: the only component that touches the filesystem
//!
//! One directory per report category, timestamp-qualified filenames so
//! repeated runs never overwrite prior output, HTML as UTF-8 and CSV as
//! UTF-8 with BOM. Files are written to a temp path and renamed into place,
//! so a reader sees either no file or the complete file.

use crate::error::{Aud365Error, Result};
use crate::report::assemble::{assemble_csv, assemble_html};
use crate::report::filter::FilterPolicy;
use crate::report::model::{ArtifactEncoding, OutputArtifact, ReportDocument};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem configuration injected by the caller; there is no ambient
/// state and no retry loop.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub output_root: PathBuf,
}

/// Paths of the two persisted artifacts.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub html_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Render both artifacts for a document and persist them under
/// `output_root/<category>/`.
pub fn write_report(
    doc: &ReportDocument,
    category: &str,
    config: &WriterConfig,
    policy: &FilterPolicy,
) -> Result<WrittenReport> {
    let dir = config.output_root.join(sanitize_filename(category));
    // Idempotent: overlapping scheduled runs may both create it.
    fs::create_dir_all(&dir).map_err(|e| Aud365Error::OutputDirError {
        path: dir.clone(),
        reason: e.to_string(),
    })?;

    let base = format!(
        "{}_{}",
        sanitize_filename(&doc.title),
        doc.generated_at.format("%Y%m%d_%H%M%S")
    );

    // Repeated runs never overwrite prior output, even within one second.
    let mut stem = base.clone();
    let mut attempt = 1;
    while dir.join(format!("{stem}.html")).exists() || dir.join(format!("{stem}.csv")).exists() {
        attempt += 1;
        stem = format!("{base}_{attempt}");
    }

    let html = OutputArtifact {
        path: dir.join(format!("{stem}.html")),
        content: assemble_html(doc, policy),
        encoding: ArtifactEncoding::Utf8,
    };
    let csv = OutputArtifact {
        path: dir.join(format!("{stem}.csv")),
        content: assemble_csv(doc),
        encoding: ArtifactEncoding::Utf8Bom,
    };

    write_artifact(&html)?;
    write_artifact(&csv)?;

    Ok(WrittenReport {
        html_path: html.path,
        csv_path: csv.path,
    })
}

/// Write one artifact with complete-or-absent visibility: the bytes land in
/// a temp file in the destination directory, then rename into place.
fn write_artifact(artifact: &OutputArtifact) -> Result<()> {
    let tmp = temp_path(&artifact.path);

    if let Err(e) = fs::write(&tmp, artifact.bytes()) {
        let _ = fs::remove_file(&tmp);
        return Err(Aud365Error::WriteError {
            path: artifact.path.clone(),
            reason: e.to_string(),
        });
    }

    if let Err(e) = fs::rename(&tmp, &artifact.path) {
        let _ = fs::remove_file(&tmp);
        return Err(Aud365Error::WriteError {
            path: artifact.path.clone(),
            reason: e.to_string(),
        });
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::ColumnSpec;
    use crate::report::normalize::normalize;
    use chrono::Local;
    use serde_json::json;

    fn sample_document() -> ReportDocument {
        let columns = vec![ColumnSpec::new("Name"), ColumnSpec::new("Status")];
        let records = vec![json!({"Name": "Adele Vance", "Status": "OK"})];
        let normalized = normalize(&records, &columns, None);
        ReportDocument {
            title: "License Audit".to_string(),
            generated_at: Local::now(),
            columns,
            row_count: normalized.rows.len(),
            rows: normalized.rows,
            metrics: Vec::new(),
            skipped_rows: 0,
            display_capped: false,
        }
    }

    #[test]
    fn test_writes_both_artifacts_under_category_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WriterConfig {
            output_root: tmp.path().to_path_buf(),
        };

        let written = write_report(
            &sample_document(),
            "user reports",
            &config,
            &FilterPolicy::default(),
        )
        .unwrap();

        assert!(written.html_path.exists());
        assert!(written.csv_path.exists());
        assert!(written
            .html_path
            .starts_with(tmp.path().join("user_reports")));
        let name = written.html_path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("License_Audit_"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_csv_starts_with_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WriterConfig {
            output_root: tmp.path().to_path_buf(),
        };
        let written = write_report(
            &sample_document(),
            "users",
            &config,
            &FilterPolicy::default(),
        )
        .unwrap();

        let bytes = fs::read(&written.csv_path).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("Name,Status\r\n"));
    }

    #[test]
    fn test_html_has_no_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WriterConfig {
            output_root: tmp.path().to_path_buf(),
        };
        let written = write_report(
            &sample_document(),
            "users",
            &config,
            &FilterPolicy::default(),
        )
        .unwrap();

        let bytes = fs::read(&written.html_path).unwrap();
        assert!(bytes.starts_with(b"<!DOCTYPE html>"));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let config = WriterConfig {
            output_root: tmp.path().to_path_buf(),
        };
        write_report(
            &sample_document(),
            "users",
            &config,
            &FilterPolicy::default(),
        )
        .unwrap();

        let leftovers: Vec<_> = fs::read_dir(tmp.path().join("users"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_unwritable_root_is_a_structured_error() {
        // A file where the directory should be makes create_dir_all fail.
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();

        let config = WriterConfig {
            output_root: blocker,
        };
        let err = write_report(
            &sample_document(),
            "users",
            &config,
            &FilterPolicy::default(),
        )
        .unwrap_err();

        match err {
            Aud365Error::OutputDirError { path, .. } => {
                assert!(path.to_string_lossy().contains("users"));
            }
            other => panic!("expected OutputDirError, got {other:?}"),
        }
    }
}
