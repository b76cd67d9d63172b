use std::path::{Component, Path, PathBuf};

use miette::{miette, Result};

use crate::data::{template_name, Page};

const INDEX_FILE: &str = "index.html";

/// Where a page ends up, relative to the output directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permalink {
    pub url: String,
    pub output_path: PathBuf,
}

impl Permalink {
    pub fn for_page(page: &Page) -> Result<Self> {
        match &page.front_matter.permalink {
            Some(permalink) => Self::from_declared(permalink),
            None => Ok(Self::for_source(&page.rel_path)),
        }
    }

    /// Directory-per-page: `about.md` ends up as `about/index.html`,
    /// `index` sources stay index files of their directory
    pub fn for_source(rel_path: &Path) -> Self {
        let parent = rel_path.parent().unwrap_or(Path::new(""));
        let dir = match rel_path.file_stem() {
            Some(stem) if stem != "index" => parent.join(stem),
            _ => parent.to_owned(),
        };

        Self::for_dir(&dir)
    }

    /// A declared permalink ending in `/` is a directory that gets an index file
    pub fn from_declared(permalink: &str) -> Result<Self> {
        let trimmed = permalink.trim_start_matches('/');
        let path = Path::new(trimmed);

        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(miette!("permalink {permalink:?} leaves the output directory"));
        }
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return Ok(Self::for_dir(path));
        }

        Ok(Self {
            url: format!("/{}", template_name(path)),
            output_path: path.to_owned(),
        })
    }

    fn for_dir(dir: &Path) -> Self {
        let name = template_name(dir);
        let url = if name.is_empty() {
            "/".to_owned()
        } else {
            format!("/{name}/")
        };

        Self {
            url,
            output_path: dir.join(INDEX_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_get_their_own_directory() {
        let about = Permalink::for_source(Path::new("about.md"));
        assert_eq!(about.output_path, PathBuf::from("about/index.html"));
        assert_eq!(about.url, "/about/");

        let nested = Permalink::for_source(Path::new("blog/launch.njk"));
        assert_eq!(nested.output_path, PathBuf::from("blog/launch/index.html"));
        assert_eq!(nested.url, "/blog/launch/");
    }

    #[test]
    fn index_sources_stay_in_place() {
        let root = Permalink::for_source(Path::new("index.njk"));
        assert_eq!(root.output_path, PathBuf::from("index.html"));
        assert_eq!(root.url, "/");

        let services = Permalink::for_source(Path::new("services/index.html"));
        assert_eq!(services.output_path, PathBuf::from("services/index.html"));
        assert_eq!(services.url, "/services/");
    }

    #[test]
    fn declared_permalinks() {
        let dir = Permalink::from_declared("/contact-us/").unwrap();
        assert_eq!(dir.output_path, PathBuf::from("contact-us/index.html"));
        assert_eq!(dir.url, "/contact-us/");

        let file = Permalink::from_declared("/404.html").unwrap();
        assert_eq!(file.output_path, PathBuf::from("404.html"));
        assert_eq!(file.url, "/404.html");
    }

    #[test]
    fn rejects_escaping_permalinks() {
        assert!(Permalink::from_declared("../outside.html").is_err());
        assert!(Permalink::from_declared("/a/../../b/").is_err());
    }
}
