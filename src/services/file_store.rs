//! Local directory holding uploaded product images.

use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const FALLBACK_NAME: &str = "upload";
const MAX_NAME_LEN: usize = 150;
const SAVE_ATTEMPTS: usize = 5;
const COLLISION_BACKOFF: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create the directory if needed and anchor the store at its
    /// canonical path.
    pub async fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        fs::create_dir_all(root.as_ref()).await?;
        let root = fs::canonicalize(root.as_ref()).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` under a fresh `{timestamp}_{sanitized name}` and
    /// return the stored name. Never overwrites an existing file.
    pub async fn save(&self, original_filename: &str, content: &[u8]) -> io::Result<String> {
        let safe_name = sanitize_filename(original_filename);

        for _ in 0..SAVE_ATTEMPTS {
            let stored = format!("{}_{}", unique_token(), safe_name);
            let path = self.root.join(&stored);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(file = %stored, "Stored name collision, retrying");
                    tokio::time::sleep(COLLISION_BACKOFF).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Err(e) = write_all(&mut file, content).await {
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }
            return Ok(stored);
        }

        Err(io::Error::new(
            ErrorKind::AlreadyExists,
            "could not find a free name for the upload",
        ))
    }

    /// Remove a stored file. Returns `false` when it was already gone.
    pub async fn delete(&self, stored_filename: &str) -> io::Result<bool> {
        let Some(path) = self.resolve(stored_filename) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read a stored file for serving. `None` for unknown or unsafe names.
    pub async fn read(&self, stored_filename: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(stored_filename) else {
            return Ok(None);
        };

        // symlinks inside the directory must not lead outside it
        let canonical = match fs::canonicalize(&path).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if !canonical.starts_with(&self.root) {
            tracing::warn!(file = %stored_filename, "Refusing to serve file outside upload dir");
            return Ok(None);
        }

        match fs::read(&canonical).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Map a stored name to a path directly under the root, rejecting
    /// anything that is not a single plain path component.
    fn resolve(&self, stored_filename: &str) -> Option<PathBuf> {
        if stored_filename.is_empty()
            || stored_filename.contains(['/', '\\', '\0'])
            || stored_filename.starts_with('.')
        {
            return None;
        }

        let mut components = Path::new(stored_filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

async fn write_all(file: &mut fs::File, content: &[u8]) -> io::Result<()> {
    file.write_all(content).await?;
    file.flush().await
}

/// Timestamp token with microsecond resolution, e.g. `20250301153012123456`.
fn unique_token() -> String {
    Local::now().format("%Y%m%d%H%M%S%6f").to_string()
}

/// Reduce an uploaded filename to a safe single component: the directory
/// part is dropped, runs of whitespace become `_`, anything outside
/// `[A-Za-z0-9._-]` is removed, and leading dots/underscores are stripped.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_start_matches(['.', '_']);

    let mut name = if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    };

    if name.len() > MAX_NAME_LEN {
        // keep the extension when shortening
        let ext = extension_of(&name).map(|e| format!(".{e}")).unwrap_or_default();
        let keep = MAX_NAME_LEN.saturating_sub(ext.len());
        name = format!("{}{}", &name[..keep], ext);
    }
    name
}

/// Lowercase extension without the dot, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type for an image by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
