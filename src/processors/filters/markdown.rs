use tera::{try_get_value, Filter};

use crate::processors::markdown_to_html;

pub struct Markdown;

impl Filter for Markdown {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &std::collections::HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let string_content = try_get_value!("markdown", "value", String, value);

        Ok(tera::Value::String(markdown_to_html(&string_content)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
