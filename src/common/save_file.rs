use std::path::PathBuf;

use async_trait::async_trait;
use miette::{Context, IntoDiagnostic, Result};
use tokio::fs;

use crate::pipeline::ProcessingStep;

pub struct SaveFile;

pub struct SaveFileParams {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[async_trait]
impl ProcessingStep for SaveFile {
    type Input = SaveFileParams;
    type Output = PathBuf;

    #[tracing::instrument(name = "save file", level = "trace", skip_all)]
    async fn process(
        &self,
        SaveFileParams { path, contents }: Self::Input,
    ) -> Result<Self::Output> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.into_diagnostic()?;
            }
        }

        fs::write(&path, contents)
            .await
            .into_diagnostic()
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("wrote {path:?}");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("about/index.html");

        let written = SaveFile
            .process(SaveFileParams {
                path: path.clone(),
                contents: b"<h1>About</h1>".to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<h1>About</h1>");
    }
}
