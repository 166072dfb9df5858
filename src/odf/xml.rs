use crate::common::errors::MergeError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;
use std::path::Path;

/// Handle into an [`XmlDoc`] arena. Handles stay valid for the life of the
/// document; detached subtrees simply become unreachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed DOM for the XML parts of an ODF archive.
///
/// Element and attribute names are kept as the literal qualified strings
/// (`text:placeholder`, `manifest:file-entry`) so namespace prefixes
/// round-trip verbatim through parse and serialize.
#[derive(Debug)]
pub struct XmlDoc {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlDoc {
    pub fn parse_str(xml: &str) -> Result<Self, MergeError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| MergeError::TemplateFormat(e.to_string()))?;
            match event {
                Event::Start(e) => {
                    let id = Self::push_element(&mut nodes, &e, stack.last().copied())?;
                    if let Some(&parent) = stack.last() {
                        nodes[parent.0].children.push(id);
                    } else if root.is_none() {
                        root = Some(id);
                    }
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let id = Self::push_element(&mut nodes, &e, stack.last().copied())?;
                    if let Some(&parent) = stack.last() {
                        nodes[parent.0].children.push(id);
                    } else if root.is_none() {
                        root = Some(id);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(t) => {
                    if let Some(&parent) = stack.last() {
                        let text = t
                            .unescape()
                            .map_err(|e| MergeError::TemplateFormat(e.to_string()))?
                            .into_owned();
                        let id = NodeId(nodes.len());
                        nodes.push(Node {
                            kind: NodeKind::Text(text),
                            parent: Some(parent),
                            children: Vec::new(),
                        });
                        nodes[parent.0].children.push(id);
                    }
                }
                Event::CData(t) => {
                    if let Some(&parent) = stack.last() {
                        let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                        let id = NodeId(nodes.len());
                        nodes.push(Node {
                            kind: NodeKind::Text(text),
                            parent: Some(parent),
                            children: Vec::new(),
                        });
                        nodes[parent.0].children.push(id);
                    }
                }
                Event::Eof => break,
                // Declaration is re-emitted on serialize; comments, PIs and
                // doctypes carry nothing the merge needs.
                _ => {}
            }
        }

        let root =
            root.ok_or_else(|| MergeError::TemplateFormat("document has no root".to_string()))?;
        Ok(Self { nodes, root })
    }

    pub fn parse_file(path: &Path) -> Result<Self, MergeError> {
        let xml = std::fs::read_to_string(path)
            .map_err(|e| MergeError::TemplateIo(format!("{}: {e}", path.display())))?;
        Self::parse_str(&xml)
    }

    fn push_element(
        nodes: &mut Vec<Node>,
        e: &BytesStart<'_>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, MergeError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|er| MergeError::TemplateFormat(er.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        let id = NodeId(nodes.len());
        nodes.push(Node {
            kind: NodeKind::Element { name, attrs },
            parent,
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn to_xml(&self) -> Result<String, MergeError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| MergeError::Repack(e.to_string()))?;
        self.emit(self.root, &mut writer)?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| MergeError::Repack(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), MergeError> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml).map_err(|e| MergeError::Repack(e.to_string()))
    }

    fn emit(&self, id: NodeId, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), MergeError> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| MergeError::Repack(e.to_string())),
            NodeKind::Element { name, attrs } => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attrs {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if self.nodes[id.0].children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|e| MergeError::Repack(e.to_string()))
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| MergeError::Repack(e.to_string()))?;
                    for child in self.nodes[id.0].children.clone() {
                        self.emit(child, writer)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(|e| MergeError::Repack(e.to_string()))
                }
            }
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Qualified element name; empty for text nodes.
    pub fn name(&self, id: NodeId) -> &str {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => name,
            NodeKind::Text(_) => "",
        }
    }

    pub fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == name
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, key: &str) -> bool {
        self.attr(id, key).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == key) {
                entry.1 = value.to_string();
            } else {
                attrs.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.retain(|(k, _)| k != key);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0].children.clone()
    }

    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&c| c == id)?;
        if pos == 0 {
            None
        } else {
            siblings.get(pos - 1).copied()
        }
    }

    /// Nearest preceding sibling that is an element (skips text nodes).
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(id);
        while let Some(node) = current {
            if self.is_element(node) {
                return Some(node);
            }
            current = self.prev_sibling(node);
        }
        None
    }

    /// All descendant elements with the given qualified name, document order.
    pub fn descendants_named(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk_descendants(from, name, &mut found);
        found
    }

    fn walk_descendants(&self, id: NodeId, name: &str, found: &mut Vec<NodeId>) {
        for &child in &self.nodes[id.0].children {
            if self.is_named(child, name) {
                found.push(child);
            }
            self.walk_descendants(child, name, found);
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Element {
                name: name.to_string(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Deep copy of a subtree; the copy starts out detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        let children = self.nodes[id.0].children.clone();
        let copy = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts before `reference`; appends when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        self.detach(node);
        self.nodes[node.0].parent = Some(parent);
        match reference.and_then(|r| self.nodes[parent.0].children.iter().position(|&c| c == r)) {
            Some(pos) => self.nodes[parent.0].children.insert(pos, node),
            None => self.nodes[parent.0].children.push(node),
        }
    }

    /// Replaces `old` with `new` in `parent`'s child list; `old` is detached.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        self.detach(new);
        if let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == old) {
            self.nodes[old.0].parent = None;
            self.nodes[new.0].parent = Some(parent);
            self.nodes[parent.0].children[pos] = new;
        }
    }

    /// Unlinks a node from its parent. The node (and its subtree) stays in
    /// the arena but no longer appears in the serialized document.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }
}
