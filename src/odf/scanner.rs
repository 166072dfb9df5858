use crate::odf::descriptor::{Descriptor, VarKind};
use crate::odf::xml::{NodeId, XmlDoc};
use crate::odf::DocKind;
use tracing::debug;

/// Classified placeholders of one template. `singles` and `groups` keep
/// document order; group anchors carry a synthetic `grpname` attribute.
pub struct VarScan {
    pub singles: Vec<NodeId>,
    pub groups: Vec<NodeId>,
}

/// Decides the document kind from `office:body`'s first content child.
pub fn detect_kind(doc: &XmlDoc) -> DocKind {
    if let Some(&body) = doc.descendants_named(doc.root(), "office:body").first() {
        for child in doc.child_elements(body) {
            match doc.name(child) {
                "office:text" => return DocKind::Text,
                "office:spreadsheet" => return DocKind::Spreadsheet,
                _ => {}
            }
        }
    }
    DocKind::Other
}

/// Walks every placeholder, splits them into singles and group members,
/// tags group anchor rows, then strips the design-time annotation markers
/// from the document.
///
/// Must run to completion before any binding: the binder's ancestor walks
/// assume the annotations are gone.
pub fn scan(doc: &mut XmlDoc, kind: DocKind) -> VarScan {
    let mut singles = Vec::new();
    let mut groups = Vec::new();

    match kind {
        DocKind::Text => scan_text(doc, &mut singles, &mut groups),
        DocKind::Spreadsheet => scan_spreadsheet(doc, &mut singles, &mut groups),
        DocKind::Other => {}
    }

    remove_annotations(doc);
    debug!(
        singles = singles.len(),
        groups = groups.len(),
        "scanned template variables"
    );
    VarScan { singles, groups }
}

fn scan_text(doc: &mut XmlDoc, singles: &mut Vec<NodeId>, groups: &mut Vec<NodeId>) {
    for placeholder in doc.descendants_named(doc.root(), "text:placeholder") {
        let Some(anchor) = ancestor_until(doc, placeholder, &["office:text", "table:table-cell"])
        else {
            singles.push(placeholder);
            continue;
        };
        if !doc.is_named(anchor, "table:table-cell") {
            singles.push(placeholder);
            continue;
        }
        // Placeholder sits in a table cell; the cell's row is the group
        // anchor when an annotation names the group.
        let Some(row) = doc.parent(anchor) else {
            singles.push(placeholder);
            continue;
        };
        let annotations = doc.descendants_named(row, "office:annotation");
        match annotations.first() {
            None => singles.push(placeholder),
            Some(&annotation) => {
                tag_group_anchor(doc, row, annotation, groups);
            }
        }
    }
}

fn scan_spreadsheet(doc: &mut XmlDoc, singles: &mut Vec<NodeId>, groups: &mut Vec<NodeId>) {
    for placeholder in doc.descendants_named(doc.root(), "text:a") {
        let descriptor =
            Descriptor::parse(doc.attr(placeholder, "office:target-frame-name").unwrap_or(""));
        let anchor = ancestor_until(doc, placeholder, &["table:table", "table:table-row-group"]);

        // Statistic variables bind at top level even inside a group: their
        // formula spans the whole expanded column range.
        if descriptor.kind == VarKind::Statistic {
            singles.push(placeholder);
            continue;
        }
        let Some(anchor) = anchor else {
            singles.push(placeholder);
            continue;
        };
        // The design tool keeps an empty table:table-row-group behind when a
        // group is removed, so reaching the table itself means no group.
        if !doc.is_named(anchor, "table:table-row-group") {
            singles.push(placeholder);
            continue;
        }
        let annotations = doc.descendants_named(anchor, "office:annotation");
        match annotations.first() {
            None => singles.push(placeholder),
            Some(&annotation) => {
                // The grpname attribute goes on the row, not the row group.
                let Some(&row) = doc.descendants_named(anchor, "table:table-row").first() else {
                    singles.push(placeholder);
                    continue;
                };
                tag_group_anchor(doc, row, annotation, groups);
            }
        }
    }
}

// First-wins for annotations: the first one found names the group.
fn tag_group_anchor(doc: &mut XmlDoc, row: NodeId, annotation: NodeId, groups: &mut Vec<NodeId>) {
    let grpname = doc
        .last_child(annotation)
        .map(|child| doc.inner_text(child))
        .unwrap_or_default();
    doc.set_attr(row, "grpname", &grpname);
    if !groups.contains(&row) {
        groups.push(row);
    }
}

/// Nearest ancestor (starting from the placeholder's grandparent) whose
/// name is in `stops`; `None` when the walk runs off the document root.
fn ancestor_until(doc: &XmlDoc, node: NodeId, stops: &[&str]) -> Option<NodeId> {
    let parent = doc.parent(node)?;
    let mut current = doc.parent(parent)?;
    loop {
        if stops.contains(&doc.name(current)) {
            return Some(current);
        }
        current = doc.parent(current)?;
    }
}

/// Variable name of a placeholder. Text templates wrap the name in
/// quoting characters; the lookup key is the text between them
/// (characters, not bytes: the quotes are multi-byte).
pub fn var_name(doc: &XmlDoc, kind: DocKind, placeholder: NodeId) -> String {
    let raw = doc.inner_text(placeholder);
    match kind {
        DocKind::Spreadsheet => raw,
        DocKind::Text | DocKind::Other => {
            let count = raw.chars().count();
            if count < 2 {
                raw
            } else {
                raw.chars().skip(1).take(count - 2).collect()
            }
        }
    }
}

fn remove_annotations(doc: &mut XmlDoc) {
    for tag in ["office:annotation", "office:annotation-end"] {
        for node in doc.descendants_named(doc.root(), tag) {
            doc.detach(node);
        }
    }
}
