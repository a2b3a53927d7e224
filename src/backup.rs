use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::db::DB_FILE;

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/college.sqlite3";
pub const BUNDLE_FORMAT_V1: &str = "college-workspace-v1";
pub const LEGACY_SQLITE_FORMAT: &str = "legacy-sqlite3";
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Structural problems with an input bundle, as opposed to I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("bundle missing {0}")]
    MissingEntry(&'static str),
    #[error("manifest.json is invalid JSON")]
    BadManifest,
    #[error("unsupported bundle format: {0}")]
    UnsupportedFormat(String),
    #[error("not a SQLite database")]
    NotSqlite,
    #[error("database has no kv_store table")]
    NotWorkspace,
    #[error("database checksum mismatch (manifest {expected}, entry {actual})")]
    ChecksumMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: &'static str,
    pub db_sha256: String,
    pub db_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: &'static str,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_workspace_bundle(workspace: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let db_path = workspace.join(DB_FILE);
    let db_bytes = std::fs::read(&db_path)
        .with_context(|| format!("failed to read database {}", db_path.to_string_lossy()))?;
    let db_sha256 = sha256_hex(&db_bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create output file {}", out_path.to_string_lossy()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "dbEntry": DB_ENTRY,
        "dbSha256": db_sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DB_ENTRY, opts)
        .context("failed to start database entry")?;
    zip.write_all(&db_bytes)
        .context("failed to write database entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    log::info!(
        "workspace exported to {} ({} bytes)",
        out_path.to_string_lossy(),
        db_bytes.len()
    );
    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1,
        db_sha256,
        db_bytes: db_bytes.len() as u64,
    })
}

/// Replace the workspace database with the one in `in_path`. The caller
/// must have closed its connection first.
pub fn import_workspace_bundle(in_path: &Path, workspace: &Path) -> anyhow::Result<ImportSummary> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;

    let (db_bytes, format) = if is_zip_file(in_path)? {
        (read_bundle_db(in_path)?, BUNDLE_FORMAT_V1)
    } else {
        let bytes = std::fs::read(in_path).with_context(|| {
            format!("failed to read legacy sqlite backup {}", in_path.to_string_lossy())
        })?;
        (bytes, LEGACY_SQLITE_FORMAT)
    };

    if !db_bytes.starts_with(SQLITE_HEADER) {
        return Err(BundleError::NotSqlite.into());
    }

    let dst = workspace.join(DB_FILE);
    let tmp_dst = workspace.join(format!("{}.importing", DB_FILE));
    if let Err(e) = stage_database(&tmp_dst, &db_bytes) {
        let _ = std::fs::remove_file(&tmp_dst);
        return Err(e);
    }

    if dst.exists() {
        std::fs::remove_file(&dst).with_context(|| {
            format!("failed to remove existing database {}", dst.to_string_lossy())
        })?;
    }
    std::fs::rename(&tmp_dst, &dst)
        .with_context(|| format!("failed to move extracted database to {}", dst.to_string_lossy()))?;

    log::info!("workspace imported from {} ({})", in_path.to_string_lossy(), format);
    Ok(ImportSummary {
        bundle_format_detected: format,
    })
}

/// Write the candidate database next to the live one and check it opens
/// as a workspace store.
fn stage_database(tmp_dst: &Path, db_bytes: &[u8]) -> anyhow::Result<()> {
    {
        let mut out = File::create(tmp_dst).with_context(|| {
            format!("failed to create temp database {}", tmp_dst.to_string_lossy())
        })?;
        out.write_all(db_bytes)
            .context("failed to write extracted database")?;
        out.flush().context("failed to flush extracted database")?;
    }
    let conn = Connection::open_with_flags(tmp_dst, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|_| BundleError::NotSqlite)?;
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
            [],
            |r| r.get(0),
        )
        .map_err(|_| BundleError::NotSqlite)?;
    if tables == 0 {
        return Err(BundleError::NotWorkspace.into());
    }
    Ok(())
}

fn read_bundle_db(in_path: &Path) -> anyhow::Result<Vec<u8>> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .map_err(|_| BundleError::MissingEntry(MANIFEST_ENTRY))?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).map_err(|_| BundleError::BadManifest)?;
    let format = manifest.get("format").and_then(|v| v.as_str()).unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(BundleError::UnsupportedFormat(format.to_string()).into());
    }

    let mut db_bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .map_err(|_| BundleError::MissingEntry(DB_ENTRY))?
        .read_to_end(&mut db_bytes)
        .context("failed to extract database entry")?;

    if let Some(expected) = manifest.get("dbSha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(&db_bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(BundleError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            }
            .into());
        }
    }
    Ok(db_bytes)
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn seeded_workspace(dir: &Path) {
        let conn = db::open_db(dir).expect("open db");
        db::kv_set(&conn, "students", "[]").expect("kv_set");
    }

    #[test]
    fn export_then_import_restores_database() {
        let src = tempfile::tempdir().expect("tempdir");
        let dst = tempfile::tempdir().expect("tempdir");
        seeded_workspace(src.path());

        let bundle = src.path().join("out").join("backup.zip");
        let summary = export_workspace_bundle(src.path(), &bundle).expect("export");
        assert_eq!(summary.bundle_format, BUNDLE_FORMAT_V1);
        assert_eq!(summary.db_sha256.len(), 64);

        let imported = import_workspace_bundle(&bundle, dst.path()).expect("import");
        assert_eq!(imported.bundle_format_detected, BUNDLE_FORMAT_V1);

        let conn = db::open_db(dst.path()).expect("reopen");
        assert_eq!(
            db::kv_get(&conn, "students").expect("kv_get").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn tampered_checksum_is_a_bundle_error() {
        let src = tempfile::tempdir().expect("tempdir");
        seeded_workspace(src.path());
        let db_bytes = std::fs::read(src.path().join(DB_FILE)).expect("read db");

        let bundle = src.path().join("bad.zip");
        {
            let mut zip = ZipWriter::new(File::create(&bundle).expect("create"));
            let opts = FileOptions::default();
            zip.start_file(MANIFEST_ENTRY, opts).expect("manifest");
            let manifest = json!({ "format": BUNDLE_FORMAT_V1, "dbSha256": "00ff" });
            zip.write_all(manifest.to_string().as_bytes()).expect("write");
            zip.start_file(DB_ENTRY, opts).expect("db entry");
            zip.write_all(&db_bytes).expect("write");
            zip.finish().expect("finish");
        }

        let dst = tempfile::tempdir().expect("tempdir");
        let e = import_workspace_bundle(&bundle, dst.path()).expect_err("should fail");
        assert!(matches!(
            e.downcast_ref::<BundleError>(),
            Some(BundleError::ChecksumMismatch { .. })
        ));
        assert!(!dst.path().join(DB_FILE).exists());
    }

    #[test]
    fn non_sqlite_file_is_rejected_and_live_database_kept() {
        let ws = tempfile::tempdir().expect("tempdir");
        seeded_workspace(ws.path());
        let before = std::fs::read(ws.path().join(DB_FILE)).expect("read db");

        let notes = ws.path().join("notes.txt");
        std::fs::write(&notes, "hello, this is not a database at all").expect("write notes");
        let e = import_workspace_bundle(&notes, ws.path()).expect_err("should fail");
        assert!(matches!(e.downcast_ref::<BundleError>(), Some(BundleError::NotSqlite)));

        assert_eq!(std::fs::read(ws.path().join(DB_FILE)).expect("read db"), before);
        assert!(!ws.path().join(format!("{}.importing", DB_FILE)).exists());
    }

    #[test]
    fn sqlite_file_without_kv_store_is_rejected() {
        let ws = tempfile::tempdir().expect("tempdir");
        seeded_workspace(ws.path());
        let other = tempfile::tempdir().expect("tempdir");
        let foreign = other.path().join("foreign.sqlite3");
        {
            let conn = Connection::open(&foreign).expect("open foreign");
            conn.execute("CREATE TABLE marks(id INTEGER)", []).expect("create");
        }

        let e = import_workspace_bundle(&foreign, ws.path()).expect_err("should fail");
        assert!(matches!(e.downcast_ref::<BundleError>(), Some(BundleError::NotWorkspace)));
        assert!(!ws.path().join(format!("{}.importing", DB_FILE)).exists());
        let conn = db::open_db(ws.path()).expect("reopen");
        assert_eq!(db::kv_get(&conn, "students").expect("kv_get").as_deref(), Some("[]"));
    }

    #[test]
    fn bare_sqlite_file_imports_as_legacy() {
        let src = tempfile::tempdir().expect("tempdir");
        seeded_workspace(src.path());
        let dst = tempfile::tempdir().expect("tempdir");

        let imported =
            import_workspace_bundle(&src.path().join(DB_FILE), dst.path()).expect("import");
        assert_eq!(imported.bundle_format_detected, LEGACY_SQLITE_FORMAT);
        assert!(dst.path().join(DB_FILE).is_file());
    }
}
