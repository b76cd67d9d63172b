use std::path::Path;

use miette::{miette, Context, IntoDiagnostic, Result};
use tokio::fs;

use super::{FrontMatter, Page};
use crate::routing::SourceFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrontMatterFormat {
    Toml,
    Yaml,
}

impl FrontMatterFormat {
    fn delimiter(self) -> &'static str {
        match self {
            FrontMatterFormat::Toml => "+++",
            FrontMatterFormat::Yaml => "---",
        }
    }

    fn parse(self, raw: &str) -> Result<FrontMatter> {
        if raw.trim().is_empty() {
            return Ok(FrontMatter::default());
        }
        match self {
            FrontMatterFormat::Toml => toml::from_str(raw).into_diagnostic(),
            FrontMatterFormat::Yaml => serde_yaml_ng::from_str(raw).into_diagnostic(),
        }
    }
}

/// loads a page and splits off its front matter
#[tracing::instrument(level = "trace")]
pub async fn load_page(input_dir: &Path, path: &Path) -> Result<Page> {
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| miette!("{} is not a renderable source", path.display()))?;
    let string_content = load_string_content(path).await?;
    let (front_matter, body) = split_front_matter(&string_content);

    let front_matter = match front_matter {
        Some((kind, raw)) => kind
            .parse(raw)
            .with_context(|| format!("parsing {kind:?} front matter of {}", path.display()))?,
        None => FrontMatter::default(),
    };
    let rel_path = path.strip_prefix(input_dir).into_diagnostic()?.to_owned();

    Ok(Page {
        rel_path,
        format,
        front_matter,
        body: body.to_owned(),
    })
}

#[tracing::instrument(level = "trace")]
async fn load_string_content(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .into_diagnostic()
        .context("reading page content")
}

/// Splits a `+++` delimited toml or `---` delimited yaml block off the start of the content
fn split_front_matter(content: &str) -> (Option<(FrontMatterFormat, &str)>, &str) {
    [FrontMatterFormat::Toml, FrontMatterFormat::Yaml]
        .into_iter()
        .find_map(|format| {
            split_delimited(content, format.delimiter())
                .map(|(front, body)| (Some((format, front)), body))
        })
        .unwrap_or((None, content))
}

fn split_delimited<'a>(content: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let rest = content.strip_prefix(delimiter)?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    let mut offset = 0;

    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_front_matter() {
        let (front, body) = split_front_matter("+++\ntitle = \"About\"\n+++\n# About\n");
        assert_eq!(front, Some((FrontMatterFormat::Toml, "title = \"About\"\n")));
        assert_eq!(body, "# About\n");

        let (front, body) = split_front_matter("---\r\ntitle: About\r\n---\r\n# About\r\n");
        assert_eq!(front, Some((FrontMatterFormat::Yaml, "title: About\r\n")));
        assert_eq!(body, "# About\r\n");
    }

    #[test]
    fn thematic_break_without_closing_line_is_body() {
        let content = "---\n# About\n";
        assert_eq!(split_front_matter(content), (None, content));
    }

    #[test]
    fn content_without_front_matter_is_left_alone() {
        let content = "# About\n+++\n";
        assert_eq!(split_front_matter(content), (None, content));
    }

    #[test]
    fn unterminated_front_matter_is_body() {
        let content = "+++\ntitle = \"About\"\n";
        assert_eq!(split_front_matter(content), (None, content));
    }

    #[tokio::test]
    async fn loads_page_with_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("about.md");
        std::fs::write(
            &path,
            "+++\nlayout = \"base.njk\"\ntitle = \"About us\"\n+++\nHello\n",
        )
        .unwrap();

        let page = load_page(dir.path(), &path).await.unwrap();

        assert_eq!(page.rel_path, Path::new("about.md"));
        assert_eq!(page.format, SourceFormat::Markdown);
        assert_eq!(page.front_matter.layout.as_deref(), Some("base.njk"));
        assert_eq!(
            page.front_matter.data.get("title").and_then(|t| t.as_str()),
            Some("About us")
        );
        assert_eq!(page.body, "Hello\n");
    }

    #[tokio::test]
    async fn loads_page_with_yaml_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts/hello.njk");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "---\nlayout: post.njk\npermalink: /hello/\ntitle: Hello\ntags:\n  - intro\n---\n<p>{{ title }}</p>\n",
        )
        .unwrap();

        let page = load_page(dir.path(), &path).await.unwrap();

        assert_eq!(page.front_matter.layout.as_deref(), Some("post.njk"));
        assert_eq!(page.front_matter.permalink.as_deref(), Some("/hello/"));
        assert_eq!(
            page.front_matter.data.get("tags"),
            Some(&serde_json::json!(["intro"]))
        );
        assert_eq!(page.body, "<p>{{ title }}</p>\n");
    }

    #[tokio::test]
    async fn empty_front_matter_block_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "---\n---\n<h1>Home</h1>").unwrap();

        let page = load_page(dir.path(), &path).await.unwrap();

        assert_eq!(page.front_matter, FrontMatter::default());
        assert_eq!(page.body, "<h1>Home</h1>");
    }

    #[tokio::test]
    async fn invalid_yaml_front_matter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "---\ntitle: [unclosed\n---\nHome").unwrap();

        assert!(load_page(dir.path(), &path).await.is_err());
    }
}
