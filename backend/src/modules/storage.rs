use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Where uploaded files live. Keys are relative, `/`-separated paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `prefix`, keeping a sanitised form of the original
    /// file name, and returns the key.
    async fn put(&self, prefix: &str, file_name: &str, bytes: &[u8]) -> anyhow::Result<String>;

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Public URL under which the blob is served.
    fn url(&self, key: &str) -> String;
}

pub type Blobs = Arc<dyn BlobStore>;

pub struct LocalBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn path_of(&self, key: &str) -> anyhow::Result<PathBuf> {
        if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            anyhow::bail!("Invalid blob key {key}");
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, prefix: &str, file_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let key = format!(
            "{}/{}-{}",
            prefix.trim_matches('/'),
            Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let path = self.path_of(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Stored blob {key} ({} bytes)", bytes.len());
        Ok(key)
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.path_of(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_of(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key)
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        String::from("upload")
    } else {
        cleaned.chars().take(100).collect()
    }
}
