use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors from reading or writing store files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parse the JSON document at `path`, or hand back `default` when the file is absent.
pub fn load<T: DeserializeOwned>(path: &Path, default: T) -> Result<T, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(default),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `doc` the way the tutoring runtime's content sources are written: four-space
/// indentation and a trailing newline.
pub fn to_pretty_bytes<T: Serialize + ?Sized>(path: &Path, doc: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    doc.serialize(&mut ser)
        .map_err(|source| StoreError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    buf.push(b'\n');
    Ok(buf)
}

/// Overwrite `path` with `doc`. Writes a temp sibling first and renames it into place.
/// The parent directory must already exist.
pub fn save<T: Serialize + ?Sized>(path: &Path, doc: &T) -> Result<(), StoreError> {
    let bytes = to_pretty_bytes(path, doc)?;
    write_atomic(path, &bytes)
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = temp_sibling(path);
    let written = std::fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .and_then(|_| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "store write");
    Ok(())
}

/// Write `doc` to a fresh temp sibling of `path` without replacing `path` itself.
/// Used to stage a file that a later rename will commit.
pub fn stage<T: Serialize + ?Sized>(path: &Path, doc: &T) -> Result<PathBuf, StoreError> {
    let bytes = to_pretty_bytes(path, doc)?;
    let tmp = temp_sibling(path);
    if let Err(e) = std::fs::write(&tmp, &bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::io(&tmp, e));
    }
    Ok(tmp)
}

pub fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}
