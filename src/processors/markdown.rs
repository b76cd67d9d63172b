use comrak::ComrakOptions;

fn options() -> ComrakOptions {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    // pages mix markdown with inline html
    options.render.unsafe_ = true;

    options
}

pub fn markdown_to_html(content: &str) -> String {
    comrak::markdown_to_html(content, &options())
}
