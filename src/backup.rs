use crate::gradebook::PersistedState;
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const STUDENTS_ENTRY: &str = "state/students.json";
const SUBJECTS_ENTRY: &str = "state/subjects.json";
const MARKS_ENTRY: &str = "state/marks.json";
pub const BUNDLE_FORMAT_V1: &str = "gradebook-state-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_state_bundle(
    state: &PersistedState,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = [
        (STUDENTS_ENTRY, state.students.as_slice()),
        (SUBJECTS_ENTRY, state.subjects.as_slice()),
        (MARKS_ENTRY, state.marks.as_slice()),
    ];

    let checksums: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(name, bytes)| (name.to_string(), json!(sha256_hex(bytes))))
        .collect();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "sha256": checksums,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (name, bytes) in entries {
        zip.start_file(name, opts)
            .with_context(|| format!("failed to start entry {}", name))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write entry {}", name))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: entries.len() + 1,
    })
}

/// Reads a bundle written by `export_state_bundle`. Fails without side effects
/// on an unknown format or any checksum mismatch.
pub fn read_state_bundle(in_path: &Path) -> anyhow::Result<PersistedState> {
    if !is_zip_file(in_path)? {
        return Err(anyhow!(
            "not a gradebook bundle: {}",
            in_path.to_string_lossy()
        ));
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut read_entry = |name: &str| -> anyhow::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        archive
            .by_name(name)
            .with_context(|| format!("bundle missing {}", name))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {}", name))?;
        let expected = manifest
            .get("sha256")
            .and_then(|m| m.get(name))
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("manifest has no checksum for {}", name))?;
        let actual = sha256_hex(&bytes);
        if actual != expected {
            return Err(anyhow!("checksum mismatch for {}", name));
        }
        Ok(bytes)
    };

    Ok(PersistedState {
        students: read_entry(STUDENTS_ENTRY)?,
        subjects: read_entry(SUBJECTS_ENTRY)?,
        marks: read_entry(MARKS_ENTRY)?,
    })
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
