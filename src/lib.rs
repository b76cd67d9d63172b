use std::path::{Path, PathBuf};

use config::{BuildConfig, ConfigLoader};

use miette::Result;

pub mod config;
pub mod engine;
pub mod routing;
pub mod watch;

mod common;
mod context;
mod data;
mod passthrough;
mod pipeline;
mod processors;
mod rendering;

pub use engine::{BuildReport, Engine};

#[derive(Debug)]
pub struct Paths {
    /// project directory containing the optional site.toml
    pub root: PathBuf,
}

pub struct Site {
    config_loader: ConfigLoader,
}

impl Site {
    #[tracing::instrument(level = "trace")]
    pub async fn load(paths: Paths) -> Result<Self> {
        let config_loader = ConfigLoader::load(paths.root).await?;

        Ok(Self { config_loader })
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn reload(&mut self) -> Result<()> {
        self.config_loader.reload().await?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        self.config_loader.dir()
    }

    pub fn config(&self) -> &BuildConfig {
        self.config_loader.config()
    }

    /// Validates the current config and hands it to a fresh engine
    pub fn engine(&self) -> Result<Engine> {
        Engine::new(self.root(), self.config().clone())
    }

    pub async fn build(&self) -> Result<BuildReport> {
        self.engine()?.build().await
    }
}
