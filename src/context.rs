use std::path::{Path, PathBuf};

use crate::config::BuildConfig;

/// Build configuration with its directories resolved against the project root
pub struct Context {
    pub dirs: ResolvedDirs,
    pub config: BuildConfig,
}

pub struct ResolvedDirs {
    pub root_dir: PathBuf,
    pub input_dir: PathBuf,
    pub includes_dir: PathBuf,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Context {
    pub fn new(root: &Path, config: BuildConfig) -> Self {
        let input_dir = root.join(&config.dirs.input);
        let dirs = ResolvedDirs {
            root_dir: root.to_owned(),
            includes_dir: input_dir.join(&config.dirs.includes),
            data_dir: input_dir.join(&config.dirs.data),
            output_dir: root.join(&config.dirs.output),
            input_dir,
        };

        Self { dirs, config }
    }

    /// Passthrough sources resolved against the project root
    pub fn passthrough_dirs(&self) -> Vec<PathBuf> {
        self.config
            .passthrough
            .iter()
            .map(|p| self.dirs.root_dir.join(p.source()))
            .collect()
    }
}
