use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use tokio::fs;

use super::{configure_with, BuildConfig, SiteDeclaration};

pub const DECLARATION_FILE: &str = "site.toml";

/// Loads the site declarations of a project directory
/// and rebuilds the config when they change
pub struct ConfigLoader {
    dir: PathBuf,
    config: BuildConfig,
}

impl ConfigLoader {
    pub async fn load(dir: PathBuf) -> Result<Self> {
        let config = Self::load_config(&dir).await?;

        Ok(Self { dir, config })
    }

    pub async fn reload(&mut self) -> Result<()> {
        self.config = Self::load_config(&self.dir).await?;

        Ok(())
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load_config(dir: &Path) -> Result<BuildConfig> {
        let declaration = read_declaration(dir).await?;

        Ok(configure_with(&declaration))
    }
}

#[tracing::instrument(level = "trace")]
pub async fn read_declaration(dir: &Path) -> Result<SiteDeclaration> {
    let path = dir.join(DECLARATION_FILE);

    if !path.exists() {
        tracing::debug!("no {DECLARATION_FILE} found, using built-in declarations");
        return Ok(SiteDeclaration::default());
    }
    let cfg_string = fs::read_to_string(&path)
        .await
        .into_diagnostic()
        .context("reading site declarations")?;

    toml::from_str(&cfg_string)
        .into_diagnostic()
        .with_context(|| format!("parsing {}", path.display()))
}
