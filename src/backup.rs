use crate::layout::{STAGING_PREFIX, TRASH_PREFIX};
use crate::store;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const CONTENT_PREFIX: &str = "content/";
pub const BUNDLE_FORMAT_V1: &str = "tutorcontent-bundle-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    app_version: String,
    exported_at: String,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    path: String,
    sha256: String,
    bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format: String,
    pub files_written: usize,
}

pub fn export_content_bundle(root: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    if !root.is_dir() {
        return Err(anyhow!("content root not found: {}", root.to_string_lossy()));
    }
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!("failed to create output file {}", out_path.to_string_lossy())
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = Vec::with_capacity(files.len());
    for rel in &files {
        let abs = root.join(rel);
        let bytes = std::fs::read(&abs)
            .with_context(|| format!("failed to read {}", abs.to_string_lossy()))?;
        let name = bundle_name(rel);
        zip.start_file(format!("{CONTENT_PREFIX}{name}"), opts)
            .with_context(|| format!("failed to start entry {name}"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("failed to write entry {name}"))?;
        entries.push(ManifestEntry {
            path: name,
            sha256: sha256_hex(&bytes),
            bytes: bytes.len() as u64,
        });
    }

    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        entries,
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    tracing::info!(out = %out_path.display(), entries = files.len(), "content bundle exported");
    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: files.len(),
    })
}

/// Every entry is read and checked against the manifest before the first file is written.
pub fn import_content_bundle(in_path: &Path, root: &Path) -> anyhow::Result<ImportSummary> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut staged: Vec<(PathBuf, Vec<u8>)> = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        let rel = safe_relative(&entry.path)
            .ok_or_else(|| anyhow!("bundle entry escapes the content root: {}", entry.path))?;
        let mut bytes = Vec::new();
        archive
            .by_name(&format!("{CONTENT_PREFIX}{}", entry.path))
            .with_context(|| format!("bundle missing entry {}", entry.path))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read entry {}", entry.path))?;
        if sha256_hex(&bytes) != entry.sha256 {
            return Err(anyhow!("checksum mismatch for {}", entry.path));
        }
        staged.push((rel, bytes));
    }

    for (rel, bytes) in &staged {
        let dst = root.join(rel);
        if let Some(parent) = dst.parent() {
            store::ensure_dir(parent)?;
        }
        store::write_atomic(&dst, bytes)?;
    }

    tracing::info!(bundle = %in_path.display(), files = staged.len(), "content bundle imported");
    Ok(ImportSummary {
        bundle_format: manifest.format,
        files_written: staged.len(),
    })
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for ent in std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.to_string_lossy()))?
    {
        let ent = ent?;
        let p = ent.path();
        let name = ent.file_name().to_string_lossy().to_string();
        if name.starts_with(STAGING_PREFIX) || name.starts_with(TRASH_PREFIX) || is_store_temp(&name)
        {
            continue;
        }
        if p.is_dir() {
            collect_files(root, &p, out)?;
        } else if p.is_file() {
            out.push(p.strip_prefix(root)?.to_path_buf());
        }
    }
    Ok(())
}

/// In-flight `store` temp siblings (`.<name>.<uuid>.tmp`).
fn is_store_temp(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

fn bundle_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn safe_relative(name: &str) -> Option<PathBuf> {
    let p = Path::new(name);
    if name.is_empty() || !p.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(p.to_path_buf())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(root: &Path) {
        std::fs::create_dir_all(root.join("content-pool/p1/steps/p1a/tutoring")).unwrap();
        std::fs::create_dir_all(root.join("content-pool/.staging-x/p2")).unwrap();
        std::fs::write(root.join("coursePlans.json"), "[]\n").unwrap();
        std::fs::write(root.join("content-pool/p1/p1.json"), "{\"id\":\"p1\"}").unwrap();
        std::fs::write(
            root.join("content-pool/p1/steps/p1a/tutoring/p1aDefaultPathway.json"),
            "[]",
        )
        .unwrap();
        std::fs::write(root.join("content-pool/.staging-x/p2/p2.json"), "{}").unwrap();
        std::fs::write(root.join(".skillModel.json.0f3a.tmp"), "{\"half\":").unwrap();
    }

    #[test]
    fn export_then_import_restores_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        seed(&src);
        let bundle = tmp.path().join("out/content.zip");
        let summary = export_content_bundle(&src, &bundle).unwrap();
        assert_eq!(summary.entry_count, 3);

        let dst = tmp.path().join("dst");
        let imported = import_content_bundle(&bundle, &dst).unwrap();
        assert_eq!(imported.files_written, 3);
        assert_eq!(
            std::fs::read_to_string(dst.join("content-pool/p1/p1.json")).unwrap(),
            "{\"id\":\"p1\"}"
        );
        assert!(!dst.join("content-pool/.staging-x").exists());
        assert!(!dst.join(".skillModel.json.0f3a.tmp").exists());
    }

    #[test]
    fn tampered_entry_is_rejected_before_writing() {
        let tmp = TempDir::new().unwrap();
        let bundle = tmp.path().join("bad.zip");
        {
            let mut zip = ZipWriter::new(File::create(&bundle).unwrap());
            let opts = FileOptions::default();
            zip.start_file("content/coursePlans.json", opts).unwrap();
            zip.write_all(b"[1]").unwrap();
            let manifest = Manifest {
                format: BUNDLE_FORMAT_V1.into(),
                app_version: "0".into(),
                exported_at: String::new(),
                entries: vec![ManifestEntry {
                    path: "coursePlans.json".into(),
                    sha256: sha256_hex(b"[]"),
                    bytes: 2,
                }],
            };
            zip.start_file(MANIFEST_ENTRY, opts).unwrap();
            zip.write_all(serde_json::to_string(&manifest).unwrap().as_bytes())
                .unwrap();
            zip.finish().unwrap();
        }
        let dst = tmp.path().join("dst");
        let e = import_content_bundle(&bundle, &dst).unwrap_err();
        assert!(e.to_string().contains("checksum"), "{e}");
        assert!(!dst.join("coursePlans.json").exists());
    }

    #[test]
    fn unsafe_paths_are_refused() {
        assert!(safe_relative("../etc/passwd").is_none());
        assert!(safe_relative("/abs.json").is_none());
        assert!(safe_relative("").is_none());
        assert_eq!(
            safe_relative("content-pool/p1/p1.json"),
            Some(PathBuf::from("content-pool/p1/p1.json"))
        );
    }
}
