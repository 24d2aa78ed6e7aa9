//! Writes generated files to disk

use async_trait::async_trait;
use similar::TextDiff;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::application::{ApplicationError, OutputService};
use crate::generation::Artifact;

/// Creates files and never replaces them.
///
/// Every target is checked before the first write. If one exists the whole
/// batch is refused with a diff of the file on disk against the content that
/// would have been written.
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }

    async fn refuse_existing(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
        for artifact in artifacts {
            if !fs::try_exists(&artifact.path).await? {
                continue;
            }
            let on_disk = fs::read_to_string(&artifact.path).await.unwrap_or_default();
            let diff = TextDiff::from_lines(&on_disk, &artifact.content)
                .unified_diff()
                .header("existing", "generated")
                .to_string();
            warn!(file = %artifact.path.display(), "Refusing to overwrite");
            return Err(ApplicationError::FileExists {
                path: artifact.path.clone(),
                diff,
            });
        }
        Ok(())
    }

    async fn create(&self, artifact: &Artifact) -> std::io::Result<()> {
        if let Some(dir) = artifact.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&artifact.path)
            .await?;
        file.write_all(artifact.content.as_bytes()).await?;
        file.flush().await
    }
}

fn output_error(action: &str, path: &Path, e: std::io::Error) -> ApplicationError {
    ApplicationError::OutputError(format!("Failed to {action} {}: {e}", path.display()))
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
        self.refuse_existing(artifacts).await?;

        for artifact in artifacts {
            self.create(artifact)
                .await
                .map_err(|e| output_error("write", &artifact.path, e))?;
            debug!(file = %artifact.path.display(), bytes = artifact.content.len(), "Wrote file");
        }
        Ok(())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), ApplicationError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| output_error("create directory", path, e))
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}
