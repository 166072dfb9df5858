use serde_json::Value;

/// Renders a JSON value as 2-space-indented block YAML.
///
/// Strings and keys are single-quoted so path templates and free-form
/// descriptions never collide with YAML syntax; output is deterministic
/// (serde_json preserves object insertion order).
pub fn emit(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(_) | Value::Array(_) => write_block(value, 0, &mut out),
        scalar => {
            out.push_str(&scalar_text(scalar));
            out.push('\n');
        }
    }
    out
}

fn write_block(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push_indent(indent, out);
                out.push_str(&quote(key));
                out.push(':');
                finish_entry(child, indent, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                push_indent(indent, out);
                out.push('-');
                finish_entry(item, indent, out);
            }
        }
        _ => {}
    }
}

fn finish_entry(value: &Value, indent: usize, out: &mut String) {
    if is_block(value) {
        out.push('\n');
        write_block(value, indent + 1, out);
    } else {
        out.push(' ');
        out.push_str(&scalar_text(value));
        out.push('\n');
    }
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
