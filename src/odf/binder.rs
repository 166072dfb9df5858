use crate::common::errors::MergeError;
use crate::odf::cell_ref::CellRef;
use crate::odf::descriptor::{is_number, Descriptor, VarKind};
use crate::odf::manifest::ManifestFile;
use crate::odf::xml::{NodeId, XmlDoc};
use crate::odf::DocKind;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::warn;

/// Substitutes scanned placeholders with request values.
///
/// Singles must be bound before groups: statistic formulas land in the
/// group's anchor row and are cloned with it on the first expansion pass.
pub struct Binder<'a> {
    doc: &'a mut XmlDoc,
    kind: DocKind,
    pictures_dir: PathBuf,
    manifest: &'a ManifestFile,
    pic_serial: u32,
}

impl<'a> Binder<'a> {
    pub fn new(
        doc: &'a mut XmlDoc,
        kind: DocKind,
        pictures_dir: PathBuf,
        manifest: &'a ManifestFile,
    ) -> Self {
        Self {
            doc,
            kind,
            pictures_dir,
            manifest,
            pic_serial: 0,
        }
    }

    /// Number of image parts written so far; also the next `Pictures/<n>` serial.
    pub fn pictures_written(&self) -> u32 {
        self.pic_serial
    }

    pub fn bind_singles(
        &mut self,
        data: &Map<String, Value>,
        singles: &[NodeId],
    ) -> Result<(), MergeError> {
        self.bind_set(data, singles)
    }

    fn bind_set(&mut self, data: &Map<String, Value>, vars: &[NodeId]) -> Result<(), MergeError> {
        for &placeholder in vars {
            // A placeholder can be gone already (its row was dropped).
            if self.doc.parent(placeholder).is_none() {
                continue;
            }
            let raw = self
                .doc
                .attr(placeholder, self.kind.descriptor_attr())
                .unwrap_or("")
                .to_string();
            let descriptor = Descriptor::parse(&raw);
            match descriptor.kind {
                VarKind::File => self.bind_file(placeholder, &descriptor, data)?,
                VarKind::Statistic => self.bind_statistic(placeholder, &descriptor, data),
                _ => self.bind_scalar(placeholder, &descriptor, data),
            }
        }
        Ok(())
    }

    /// Expands every group anchor row against its data sequence.
    pub fn bind_groups(
        &mut self,
        data: &Map<String, Value>,
        groups: &[NodeId],
    ) -> Result<(), MergeError> {
        for &anchor in groups {
            let grpname = self.doc.attr(anchor, "grpname").unwrap_or("").to_string();
            let entries = match data.get(&grpname) {
                Some(Value::Array(entries)) => entries.clone(),
                Some(_) | None => {
                    warn!(group = %grpname, "data shape: group value missing or not a sequence");
                    self.doc.detach(anchor);
                    continue;
                }
            };

            let init_row = self.init_template_row(anchor);
            self.update_row_spans(anchor, entries.len());

            let Some(table) = self.doc.parent(anchor) else {
                continue;
            };
            let mut cursor = anchor;
            for (i, entry) in entries.iter().enumerate() {
                // Iteration 0 keeps the anchor row's original formatting.
                let clone = if i == 0 {
                    self.doc.clone_subtree(anchor)
                } else {
                    self.doc.clone_subtree(init_row)
                };
                let next = self.doc.next_sibling(cursor);
                self.doc.insert_before(table, clone, next);
                // Clones inherit the synthetic scanner attribute.
                self.doc.remove_attr(clone, "grpname");
                cursor = clone;

                let mut row_data: Map<String, Value> =
                    entry.as_object().cloned().unwrap_or_default();
                let row_vars = self.doc.descendants_named(clone, self.kind.placeholder_tag());
                if i == 0 {
                    // Names absent from the first entry may refer to
                    // top-level request values.
                    for &var in &row_vars {
                        let name = self.lookup_name(var);
                        if row_data.contains_key(&name) {
                            continue;
                        }
                        if let Some(value) = data.get(&name) {
                            if !value.is_null() {
                                row_data.insert(name, value.clone());
                            }
                        }
                    }
                }
                self.bind_set(&row_data, &row_vars)?;
            }
            self.doc.detach(anchor);
        }
        Ok(())
    }

    fn bind_scalar(&mut self, placeholder: NodeId, descriptor: &Descriptor, data: &Map<String, Value>) {
        let name = self.lookup_name(placeholder);
        let Some(value) = data.get(&name).filter(|v| !v.is_null()) else {
            self.doc.detach(placeholder);
            return;
        };
        let text = apply_items(descriptor, value_to_string(value));

        let spreadsheet = self.kind == DocKind::Spreadsheet;
        if spreadsheet && descriptor.kind == VarKind::Auto && is_number(&text) {
            // Auto promotes to a float cell when the value parses as a number.
            if let Some(cell) = self.enclosing_cell(placeholder) {
                self.doc.set_attr(cell, "office:value", &text);
                self.doc.set_attr(cell, "office:value-type", "float");
                self.doc.set_attr(cell, "calcext:value-type", "float");
            }
            self.replace_with_text(placeholder, &text);
        } else if spreadsheet
            && matches!(
                descriptor.kind,
                VarKind::Float
                    | VarKind::Percentage
                    | VarKind::Currency
                    | VarKind::Date
                    | VarKind::Time
            )
        {
            if let Some(cell) = self.enclosing_cell(placeholder) {
                self.doc
                    .set_attr(cell, "office:value-type", descriptor.kind.as_str());
                self.doc
                    .set_attr(cell, "calcext:value-type", descriptor.kind.as_str());
                if !descriptor.format.is_empty() {
                    let attr = format!("office:{}", descriptor.format);
                    self.doc.set_attr(cell, &attr, &text);
                }
            }
            self.replace_with_text(placeholder, &text);
        } else {
            self.replace_with_text(placeholder, &text);
        }
    }

    fn bind_statistic(
        &mut self,
        placeholder: NodeId,
        descriptor: &Descriptor,
        data: &Map<String, Value>,
    ) {
        let len = match data.get(&descriptor.group_name) {
            Some(Value::Array(entries)) => entries.len(),
            Some(_) | None => {
                warn!(
                    group = %descriptor.group_name,
                    "data shape: statistic group missing or not a sequence"
                );
                self.doc.detach(placeholder);
                return;
            }
        };
        let cell_ref = match CellRef::parse(&descriptor.column) {
            Ok(cell_ref) => cell_ref,
            Err(err) => {
                warn!(column = %descriptor.column, %err, "statistic column unparseable");
                self.doc.detach(placeholder);
                return;
            }
        };

        let formula = format!(
            "of:={}({})",
            aggregate_operator(&descriptor.method),
            cell_ref.range(len)
        );
        let new_cell = self.doc.create_element("table:table-cell");
        self.doc.set_attr(new_cell, "table:formula", &formula);
        self.doc.set_attr(new_cell, "office:value-type", "float");
        self.doc.set_attr(new_cell, "calcext:value-type", "float");

        // The whole enclosing cell is replaced, not just the anchor.
        let Some(cell) = self.enclosing_cell(placeholder) else {
            self.doc.detach(placeholder);
            return;
        };
        let Some(container) = self.doc.parent(cell) else {
            self.doc.detach(placeholder);
            return;
        };
        self.doc.replace_child(container, new_cell, cell);
    }

    fn bind_file(
        &mut self,
        placeholder: NodeId,
        descriptor: &Descriptor,
        data: &Map<String, Value>,
    ) -> Result<(), MergeError> {
        let name = self.lookup_name(placeholder);
        let Some(value) = data.get(&name).filter(|v| !v.is_null()) else {
            self.doc.detach(placeholder);
            return Ok(());
        };
        let encoded: String = value_to_string(value)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = match BASE64.decode(encoded.as_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(variable = %name, %err, "encoding failure: image value is not valid base64");
                self.doc.detach(placeholder);
                return Ok(());
            }
        };

        // Stage in a scratch dir, then copy the part into the archive.
        let staging = tempfile::tempdir().map_err(|e| MergeError::TemplateIo(e.to_string()))?;
        let staged = staging.path().join(format!("pic-{}", self.pic_serial));
        std::fs::write(&staged, &bytes)?;

        std::fs::create_dir_all(&self.pictures_dir)?;
        let part = self.pictures_dir.join(self.pic_serial.to_string());
        std::fs::copy(&staged, &part)?;
        self.manifest.register_picture(self.pic_serial)?;

        let (width, height) = descriptor.frame_size();
        let frame = self.doc.create_element("draw:frame");
        match self.kind {
            DocKind::Spreadsheet => {
                self.doc.set_attr(frame, "draw:style-name", "gr1");
            }
            DocKind::Text | DocKind::Other => {
                self.doc.set_attr(frame, "draw:style-name", "fr1");
                self.doc.set_attr(frame, "text:anchor-type", "as-char");
            }
        }
        self.doc.set_attr(frame, "draw:name", "Image1");
        self.doc.set_attr(frame, "svg:width", &width);
        self.doc.set_attr(frame, "svg:height", &height);
        self.doc.set_attr(frame, "draw:z-index", "1");

        let image = self.doc.create_element("draw:image");
        self.doc
            .set_attr(image, "xlink:href", &format!("Pictures/{}", self.pic_serial));
        self.doc.set_attr(image, "xlink:type", "simple");
        self.doc.set_attr(image, "xlink:show", "embed");
        self.doc.set_attr(image, "xlink:actuate", "onLoad");
        self.doc.set_attr(image, "loext:mime-type", "image/png");
        self.doc.append_child(frame, image);

        match self.kind {
            DocKind::Spreadsheet => {
                // Replace the whole cell so no stale value attributes remain.
                let new_cell = self.doc.create_element("table:table-cell");
                self.doc.append_child(new_cell, frame);
                let Some(cell) = self.enclosing_cell(placeholder) else {
                    self.doc.detach(placeholder);
                    return Ok(());
                };
                let Some(container) = self.doc.parent(cell) else {
                    self.doc.detach(placeholder);
                    return Ok(());
                };
                self.doc.replace_child(container, new_cell, cell);
            }
            DocKind::Text | DocKind::Other => {
                if let Some(parent) = self.doc.parent(placeholder) {
                    self.doc.replace_child(parent, frame, placeholder);
                }
            }
        }

        self.pic_serial += 1;
        Ok(())
    }

    /// Deep-clones the anchor row and clears everything a fresh data row
    /// must not inherit: contents and value attributes of non-variable
    /// cells, and statistic cells (their formula is produced once, in the
    /// anchor row).
    fn init_template_row(&mut self, anchor: NodeId) -> NodeId {
        let row = self.doc.clone_subtree(anchor);
        match self.kind {
            DocKind::Spreadsheet => {
                for cell in self.doc.child_elements(row) {
                    let vars = self.doc.descendants_named(cell, "text:a");
                    if let Some(&var) = vars.first() {
                        let raw = self
                            .doc
                            .attr(var, "office:target-frame-name")
                            .unwrap_or("")
                            .to_string();
                        if Descriptor::parse(&raw).kind == VarKind::Statistic {
                            if let Some(paragraph) = self.doc.parent(var) {
                                self.doc.detach(paragraph);
                            }
                            self.doc.remove_attr(cell, "office:value");
                            self.doc.remove_attr(cell, "office:value-type");
                            self.doc.remove_attr(cell, "calcext:value-type");
                        }
                    } else {
                        for child in self.doc.child_elements(cell) {
                            if self.doc.is_named(child, "text:p") {
                                self.doc.detach(child);
                            }
                        }
                        self.doc.remove_attr(cell, "office:value");
                        self.doc.remove_attr(cell, "office:value-type");
                        self.doc.remove_attr(cell, "calcext:value-type");
                        self.doc.remove_attr(cell, "table:formula");
                    }
                }
            }
            DocKind::Text | DocKind::Other => {
                for cell in self.doc.child_elements(row) {
                    if self.doc.descendants_named(cell, "text:placeholder").is_empty()
                        && self.doc.descendants_named(cell, "text:list").is_empty()
                    {
                        if let Some(&paragraph) =
                            self.doc.descendants_named(cell, "text:p").first()
                        {
                            self.doc.detach(paragraph);
                        }
                    }
                }
            }
        }
        row
    }

    /// Rows spanning into the group region must cover the expanded height.
    fn update_row_spans(&mut self, anchor: NodeId, len: usize) {
        let span = (len + 1).to_string();
        let mut targets: Vec<NodeId> = Vec::new();

        let mut up = self.doc.parent(anchor);
        while let Some(node) = up {
            if self.doc.has_attr(node, "table:number-rows-spanned") {
                targets.push(node);
            }
            up = self.doc.parent(node);
        }

        match self.kind {
            DocKind::Spreadsheet => {
                let mut scope = anchor;
                loop {
                    if self.doc.is_named(scope, "table:table-row-group") {
                        break;
                    }
                    match self.doc.parent(scope) {
                        Some(parent) => scope = parent,
                        None => {
                            scope = anchor;
                            break;
                        }
                    }
                }
                let cells = match self.doc.prev_element_sibling(scope) {
                    Some(prev) => self.doc.child_elements(prev),
                    None => self.doc.child_elements(scope),
                };
                targets.extend(
                    cells
                        .into_iter()
                        .filter(|&c| self.doc.has_attr(c, "table:number-rows-spanned")),
                );
            }
            DocKind::Text | DocKind::Other => {
                if let Some(prev) = self.doc.prev_element_sibling(anchor) {
                    targets.extend(
                        self.doc
                            .child_elements(prev)
                            .into_iter()
                            .filter(|&c| self.doc.has_attr(c, "table:number-rows-spanned")),
                    );
                }
            }
        }

        for target in targets {
            self.doc.set_attr(target, "table:number-rows-spanned", &span);
        }
    }

    fn lookup_name(&self, placeholder: NodeId) -> String {
        crate::odf::scanner::var_name(self.doc, self.kind, placeholder)
    }

    fn replace_with_text(&mut self, placeholder: NodeId, text: &str) {
        if let Some(parent) = self.doc.parent(placeholder) {
            let text_node = self.doc.create_text(text);
            self.doc.replace_child(parent, text_node, placeholder);
        }
    }

    // The value cell sits two levels above the placeholder (placeholder →
    // paragraph → cell).
    fn enclosing_cell(&self, placeholder: NodeId) -> Option<NodeId> {
        let paragraph = self.doc.parent(placeholder)?;
        self.doc.parent(paragraph)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Enum values that look numeric are 1-based indexes into `Items`;
/// booleans pick the first label for `1`/`true`/`yes` and the second
/// otherwise.
fn apply_items(descriptor: &Descriptor, value: String) -> String {
    match descriptor.kind {
        VarKind::Enum if is_number(&value) => {
            let labels = descriptor.items_labels();
            let index = value
                .trim()
                .parse::<f64>()
                .map(|f| f as i64 - 1)
                .unwrap_or(-1);
            if index >= 0 && (index as usize) < labels.len() {
                labels[index as usize].clone()
            } else {
                value
            }
        }
        VarKind::Boolean => {
            let labels = descriptor.items_labels();
            let truthy = value == "1"
                || value.eq_ignore_ascii_case("true")
                || value.eq_ignore_ascii_case("yes");
            let index = if truthy { 0 } else { 1 };
            labels.get(index).cloned().unwrap_or(value)
        }
        _ => value,
    }
}

/// Localized aggregate names map to formula operators; anything else
/// passes through literally.
fn aggregate_operator(method: &str) -> String {
    match method {
        "總和" => "SUM".to_string(),
        "最大值" => "MAX".to_string(),
        "最小值" => "MIN".to_string(),
        "中位數" => "MEDIAN".to_string(),
        "計數" => "COUNT".to_string(),
        "平均" => "AVERAGE".to_string(),
        other => other.to_string(),
    }
}
