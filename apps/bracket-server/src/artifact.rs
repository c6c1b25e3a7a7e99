//! Keeps the bracket artifact available at the serving location.
//!
//! The generator writes the artifact relative to its own working directory
//! (the source location), which need not match the directory the HTTP layer
//! serves from. Publishing reconciles the two.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// A fresh source copy replaced whatever was being served.
    Copied { bytes: u64 },
    /// No source copy; an earlier artifact at the serving location stands.
    Reused,
}

impl Publication {
    pub fn label(self) -> &'static str {
        match self {
            Publication::Copied { .. } => "copied",
            Publication::Reused => "reused",
        }
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Generated bracket file not found")]
    Missing {
        source_path: PathBuf,
        serving_path: PathBuf,
    },
    #[error("Failed to publish generated bracket: {0}")]
    Copy(#[source] io::Error),
}

#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    async fn publish(&self) -> Result<Publication, ArtifactError>;
}

#[derive(Debug, Clone)]
pub struct FsArtifactPublisher {
    source: PathBuf,
    serving: PathBuf,
}

impl FsArtifactPublisher {
    pub fn new(source: impl Into<PathBuf>, serving: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            serving: serving.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn serving(&self) -> &Path {
        &self.serving
    }
}

#[async_trait]
impl ArtifactPublisher for FsArtifactPublisher {
    async fn publish(&self) -> Result<Publication, ArtifactError> {
        if exists(&self.source).await {
            if let Some(parent) = self.serving.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(ArtifactError::Copy)?;
                }
            }
            // Unlocked: concurrent publishers race and the last copy wins.
            let bytes = tokio::fs::copy(&self.source, &self.serving)
                .await
                .map_err(|err| {
                    error!(
                        source = %self.source.display(),
                        serving = %self.serving.display(),
                        error = %err,
                        "failed to copy bracket artifact"
                    );
                    ArtifactError::Copy(err)
                })?;
            info!(
                source = %self.source.display(),
                serving = %self.serving.display(),
                bytes,
                "published bracket artifact"
            );
            return Ok(Publication::Copied { bytes });
        }

        if exists(&self.serving).await {
            warn!(
                serving = %self.serving.display(),
                "no fresh bracket artifact at source; serving previous copy"
            );
            return Ok(Publication::Reused);
        }

        error!(
            source = %self.source.display(),
            serving = %self.serving.display(),
            "bracket artifact missing from both locations"
        );
        Err(ArtifactError::Missing {
            source_path: self.source.clone(),
            serving_path: self.serving.clone(),
        })
    }
}

/// A path that cannot be inspected counts as absent, so the publisher can
/// still fall back to the serving copy.
async fn exists(path: &Path) -> bool {
    match tokio::fs::try_exists(path).await {
        Ok(found) => found,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "unable to inspect bracket artifact; treating as absent"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = "tournament_bracket.html";

    fn publisher(root: &Path) -> FsArtifactPublisher {
        FsArtifactPublisher::new(root.join(ARTIFACT), root.join("api").join(ARTIFACT))
    }

    #[tokio::test]
    async fn copies_source_artifact_to_serving_location() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());
        std::fs::write(publisher.source(), "<html>fresh</html>").unwrap();

        let publication = publisher.publish().await.unwrap();

        assert_eq!(publication, Publication::Copied { bytes: 18 });
        assert_eq!(
            std::fs::read_to_string(publisher.serving()).unwrap(),
            "<html>fresh</html>"
        );
    }

    #[tokio::test]
    async fn fresh_source_overwrites_existing_serving_copy() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());
        std::fs::create_dir_all(publisher.serving().parent().unwrap()).unwrap();
        std::fs::write(publisher.serving(), "<html>stale</html>").unwrap();
        std::fs::write(publisher.source(), "<html>fresh</html>").unwrap();

        publisher.publish().await.unwrap();

        assert_eq!(
            std::fs::read_to_string(publisher.serving()).unwrap(),
            "<html>fresh</html>"
        );
    }

    #[tokio::test]
    async fn serving_copy_alone_satisfies_publication() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());
        std::fs::create_dir_all(publisher.serving().parent().unwrap()).unwrap();
        std::fs::write(publisher.serving(), "<html>previous</html>").unwrap();

        let publication = publisher.publish().await.unwrap();

        assert_eq!(publication, Publication::Reused);
        assert!(!publisher.source().exists());
        assert_eq!(
            std::fs::read_to_string(publisher.serving()).unwrap(),
            "<html>previous</html>"
        );
    }

    #[tokio::test]
    async fn missing_everywhere_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());

        let err = publisher.publish().await.unwrap_err();

        assert!(matches!(err, ArtifactError::Missing { .. }));
        assert_eq!(err.to_string(), "Generated bracket file not found");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn uninspectable_source_falls_back_to_serving_copy() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected makes stat fail with
        // ENOTDIR rather than report the path as missing.
        std::fs::write(dir.path().join("gen"), "not a directory").unwrap();
        let source = dir.path().join("gen").join(ARTIFACT);
        let serving = dir.path().join("api").join(ARTIFACT);
        assert!(tokio::fs::try_exists(&source).await.is_err());
        assert!(!exists(&source).await);

        std::fs::create_dir_all(serving.parent().unwrap()).unwrap();
        std::fs::write(&serving, "<html>previous</html>").unwrap();
        let publisher = FsArtifactPublisher::new(source, serving);

        assert_eq!(publisher.publish().await.unwrap(), Publication::Reused);
    }
}
