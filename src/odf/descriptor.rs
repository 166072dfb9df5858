use tracing::{debug, warn};

/// Placeholder value type from the descriptor's `Type` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VarKind {
    #[default]
    Str,
    Auto,
    Float,
    Percentage,
    Currency,
    Date,
    Time,
    Boolean,
    Enum,
    File,
    Statistic,
}

impl VarKind {
    // Unknown type names fall back to plain strings; `image` is the
    // designer-facing name for the internal file kind.
    fn from_raw(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "image" => VarKind::File,
            "enum" => VarKind::Enum,
            "auto" => VarKind::Auto,
            "boolean" => VarKind::Boolean,
            "float" => VarKind::Float,
            "percentage" => VarKind::Percentage,
            "currency" => VarKind::Currency,
            "date" => VarKind::Date,
            "time" => VarKind::Time,
            "statistic" => VarKind::Statistic,
            _ => VarKind::Str,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Str => "string",
            VarKind::Auto => "auto",
            VarKind::Float => "float",
            VarKind::Percentage => "percentage",
            VarKind::Currency => "currency",
            VarKind::Date => "date",
            VarKind::Time => "time",
            VarKind::Boolean => "boolean",
            VarKind::Enum => "enum",
            VarKind::File => "file",
            VarKind::Statistic => "statistic",
        }
    }

    /// JSON Schema type for the emitted API description.
    pub fn json_type(&self) -> &'static str {
        match self {
            VarKind::Float | VarKind::Percentage => "number",
            VarKind::Currency => "integer",
            VarKind::Boolean => "boolean",
            VarKind::File => "array",
            _ => "string",
        }
    }

    /// Type label shown in the sample hint document.
    pub fn sample_hint(&self) -> &'static str {
        match self {
            VarKind::Auto => "string or float",
            other => other.as_str(),
        }
    }
}

/// Parsed form of the `Key:Value;Key:Value` descriptor attached to a
/// placeholder. Parsed once per placeholder instead of re-tokenizing the
/// raw string for every key lookup.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    pub kind: VarKind,
    pub items: String,
    pub description: String,
    pub format: String,
    pub api_help: String,
    pub size: String,
    pub group_name: String,
    pub column: String,
    pub method: String,
}

impl Descriptor {
    pub fn parse(raw: &str) -> Self {
        let mut descriptor = Self::default();
        for token in raw.split(';') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let Some((key, value)) = token.split_once(':') else {
                // Non-fatal: the placeholder keeps behaving as a string.
                warn!(token, "descriptor format: token without ':' ignored");
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key.to_ascii_lowercase().as_str() {
                "type" => descriptor.kind = VarKind::from_raw(value),
                "items" => descriptor.items = value.to_string(),
                "description" => descriptor.description = value.to_string(),
                "format" => descriptor.format = value.to_string(),
                "apihelp" => descriptor.api_help = value.to_string(),
                "size" => descriptor.size = value.to_string(),
                "groupname" => descriptor.group_name = value.to_string(),
                "column" => descriptor.column = value.to_string(),
                "method" => descriptor.method = value.to_string(),
                other => debug!(key = other, "unknown descriptor key"),
            }
        }
        descriptor
    }

    /// `Items` labels with the surrounding quotes stripped.
    pub fn items_labels(&self) -> Vec<String> {
        self.items
            .replace('"', "")
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Frame dimensions from `Size` (`WxH` in centimetres).
    pub fn frame_size(&self) -> (String, String) {
        let mut parts = self
            .size
            .split('x')
            .map(str::trim)
            .filter(|part| !part.is_empty());
        match (parts.next(), parts.next()) {
            (Some(width), Some(height)) => (format!("{width}cm"), format!("{height}cm")),
            _ => ("2.5cm".to_string(), "1.5cm".to_string()),
        }
    }
}

/// Numeric detector used by `auto` promotion and enum indexing: optional
/// leading spaces, optional sign, digits with at most one `.` (and at least
/// one digit), optional trailing spaces. A bare `.` is not a number.
pub fn is_number(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }
    if chars.peek().is_none() {
        return false;
    }
    if matches!(chars.peek(), Some('+') | Some('-')) {
        chars.next();
    }
    let mut digits = 0usize;
    let mut dots = 0usize;
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if c == '.' {
            dots += 1;
        } else {
            break;
        }
        chars.next();
    }
    if dots > 1 || digits < 1 {
        return false;
    }
    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }
    chars.peek().is_none()
}
