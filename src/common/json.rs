use crate::common::errors::MergeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub struct JsonUtil;

impl JsonUtil {
    pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, MergeError> {
        serde_json::from_value(value).map_err(|e| MergeError::DataShape(e.to_string()))
    }

    pub fn to_value<T: Serialize>(value: T) -> Result<Value, MergeError> {
        serde_json::to_value(value).map_err(|e| MergeError::DataShape(e.to_string()))
    }

    // Request bodies historically arrive with `NULL`/`True`/`FALSE` spellings.
    // Lowercase the bare keywords outside string literals, then parse strictly.
    pub fn parse_lenient(input: &str) -> Result<Value, MergeError> {
        let normalized = Self::lower_bare_keywords(input);
        serde_json::from_str(&normalized).map_err(|e| MergeError::DataShape(e.to_string()))
    }

    fn lower_bare_keywords(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = chars.next() {
            if in_string {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                c if c.is_ascii_alphabetic() => {
                    let mut word = String::new();
                    word.push(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphabetic() {
                            word.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let lowered = word.to_ascii_lowercase();
                    if lowered == "null" || lowered == "true" || lowered == "false" {
                        out.push_str(&lowered);
                    } else {
                        out.push_str(&word);
                    }
                }
                _ => out.push(c),
            }
        }
        out
    }
}
