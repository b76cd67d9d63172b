use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::routing::SourceFormat;

pub const PAGE_TEMPLATE_PREFIX: &str = "@page/";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    /// template in the includes dir the page is wrapped in
    pub layout: Option<String>,

    /// output location overriding the directory-per-page default
    pub permalink: Option<String>,

    /// remaining data of this page
    /// passed to the templates when rendering
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug)]
pub struct Page {
    /// path relative to the input directory
    pub rel_path: PathBuf,
    pub format: SourceFormat,
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Page {
    /// Name under which the page body is registered as a template,
    /// prefixed so it can't collide with templates from the includes dir
    pub fn template_name(&self) -> String {
        format!("{PAGE_TEMPLATE_PREFIX}{}", template_name(&self.rel_path))
    }
}

pub(crate) fn template_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
