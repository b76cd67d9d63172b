use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use tokio::fs;

/// Data from the data directory, keyed by file stem
pub type GlobalData = serde_json::Map<String, serde_json::Value>;

/// Reads every json and toml file directly inside the data directory.
/// A missing directory yields no data.
#[tracing::instrument(level = "trace")]
pub async fn load_global_data(dir: &Path) -> Result<GlobalData> {
    let mut data = GlobalData::new();

    if !dir.exists() {
        return Ok(data);
    }
    let mut read_dir = fs::read_dir(dir).await.into_diagnostic()?;

    while let Some(entry) = read_dir.next_entry().await.into_diagnostic()? {
        let path = entry.path();
        let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        let value = match extension.as_deref() {
            Some("json") => {
                let content = read_data_file(&path).await?;
                serde_json::from_str(&content)
                    .into_diagnostic()
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            Some("toml") => {
                let content = read_data_file(&path).await?;
                let value: toml::Value = toml::from_str(&content)
                    .into_diagnostic()
                    .with_context(|| format!("parsing {}", path.display()))?;
                serde_json::to_value(value).into_diagnostic()?
            }
            _ => continue,
        };
        tracing::debug!("loaded global data `{key}`");
        data.insert(key, value);
    }

    Ok(data)
}

async fn read_data_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .into_diagnostic()
        .context("reading data file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keys_data_by_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.json"), r#"{"name": "Next3Labs"}"#).unwrap();
        std::fs::write(dir.path().join("nav.toml"), "links = [\"/about/\"]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let data = load_global_data(dir.path()).await.unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["site"]["name"], "Next3Labs");
        assert_eq!(data["nav"]["links"][0], "/about/");
    }

    #[tokio::test]
    async fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load_global_data(&dir.path().join("_data")).await.unwrap();

        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn reports_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        assert!(load_global_data(dir.path()).await.is_err());
    }
}
