use crate::schema::{combined_description, TemplateSchema, VarSpec};

const INDENT: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

/// Inline hint document shown to API consumers: one `"name": "type  //
/// description"` line per variable, HTML-escaped with `<br />`
/// separators. Groups render as an array with a single inline object.
pub fn emit(schema: &TemplateSchema) -> String {
    let mut buf = String::new();
    for var in &schema.singles {
        buf.push_str(&format!("\"{}\": \"{}\",<br />", var.name, hint(var)));
    }
    for group in &schema.groups {
        buf.push_str(INDENT);
        buf.push_str(&format!("\"{}\":[<br />", group.name));
        buf.push_str(INDENT);
        buf.push_str(INDENT);
        buf.push('{');
        let inner: Vec<String> = group
            .vars
            .iter()
            .map(|var| format!("\"{}\": \"{}\"", var.name, hint(var)))
            .collect();
        buf.push_str(&inner.join(","));
        buf.push_str(&format!("}}<br />{INDENT}],<br />"));
    }
    // The last entry must not carry the separator.
    if let Some(stripped) = buf.strip_suffix(",<br />") {
        buf = format!("{stripped}<br />");
    }
    format!("{{<br />{buf}}}")
}

fn hint(var: &VarSpec) -> String {
    let description = combined_description(&var.descriptor);
    if description.is_empty() {
        var.descriptor.kind.sample_hint().to_string()
    } else {
        format!("{}  // {}", var.descriptor.kind.sample_hint(), description)
    }
}
