use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("the {name} directory is not declared")]
    #[diagnostic(
        code(sitebuild::config::missing_dir),
        help("declare every directory under `[dirs]` in site.toml")
    )]
    MissingDir { name: &'static str },

    #[error("output directory {output:?} overlaps input directory {input:?}")]
    #[diagnostic(
        code(sitebuild::config::overlapping_dirs),
        help("the output directory must not be inside the input directory or contain it")
    )]
    OverlappingDirs { input: PathBuf, output: PathBuf },

    #[error("output directory {output:?} contains the project directory")]
    #[diagnostic(
        code(sitebuild::config::output_contains_root),
        help("the output directory is removed before every build, point it inside the project")
    )]
    OutputContainsRoot { output: PathBuf },

    #[error("passthrough path {path:?} would be copied outside the output directory")]
    #[diagnostic(
        code(sitebuild::config::passthrough_outside_output),
        help("declare passthrough paths relative to the project directory without `..`")
    )]
    PassthroughOutsideOutput { path: PathBuf },
}
