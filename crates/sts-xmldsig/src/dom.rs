//! Arena-backed XML document model.
//!
//! The parser keeps exactly what canonicalization needs: element names with
//! their prefixes, namespace declarations, attributes, text, comments and
//! processing instructions. DOCTYPE declarations are refused so entity
//! expansion never happens, and element IDs must be unique.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};
use crate::types::ns;

/// Deepest element nesting accepted by [`Document::parse`].
pub const MAX_DEPTH: usize = 256;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An attribute as written in the source, minus namespace declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Prefix, if qualified.
    pub prefix: Option<String>,
    /// Local name.
    pub local_name: String,
    /// Normalized, unescaped value.
    pub value: String,
}

impl Attribute {
    /// Qualified name as written.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(self.prefix.as_deref(), &self.local_name)
    }
}

/// Element data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Prefix, if qualified.
    pub prefix: Option<String>,
    /// Local name.
    pub local_name: String,
    /// Namespace declarations made on this element. `None` is the default namespace.
    pub namespace_decls: Vec<(Option<String>, String)>,
    /// Non-namespace attributes in document order.
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Qualified name as written.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(self.prefix.as_deref(), &self.local_name)
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element.
    Element(Element),
    /// Character data, entity references resolved, line endings normalized.
    Text(String),
    /// A comment.
    Comment(String),
    /// A processing instruction, target and data as written.
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
}

impl Document {
    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Fails on malformed XML, DOCTYPE declarations, unbound prefixes,
    /// duplicate element IDs and nesting deeper than [`MAX_DEPTH`].
    pub fn parse(xml: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.expand_empty_elements(false);

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(XmlError::Parse(format!(
                            "element nesting exceeds {MAX_DEPTH} levels"
                        )));
                    }
                    let id = push_element(&mut nodes, &start, stack.last().copied(), &mut root)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    push_element(&mut nodes, &start, stack.last().copied(), &mut root)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let raw = std::str::from_utf8(&text)?;
                    match stack.last().copied() {
                        Some(parent) => {
                            let normalized = normalize_line_endings(raw);
                            let value = quick_xml::escape::unescape(&normalized)?.into_owned();
                            push_node(&mut nodes, NodeKind::Text(value), Some(parent));
                        }
                        None if raw.trim().is_empty() => {}
                        None => {
                            return Err(XmlError::Parse(
                                "character data outside the document element".to_string(),
                            ));
                        }
                    }
                }
                Event::CData(data) => {
                    let parent = stack.last().copied().ok_or_else(|| {
                        XmlError::Parse("CDATA outside the document element".to_string())
                    })?;
                    let value = std::str::from_utf8(&data)?;
                    push_node(
                        &mut nodes,
                        NodeKind::Text(normalize_line_endings(value)),
                        Some(parent),
                    );
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last().copied() {
                        let value = std::str::from_utf8(&comment)?;
                        push_node(&mut nodes, NodeKind::Comment(value.to_string()), Some(parent));
                    }
                }
                Event::PI(pi) => {
                    if let Some(parent) = stack.last().copied() {
                        let value = std::str::from_utf8(&pi)?;
                        push_node(
                            &mut nodes,
                            NodeKind::ProcessingInstruction(value.to_string()),
                            Some(parent),
                        );
                    }
                }
                Event::DocType(_) => return Err(XmlError::DoctypeNotAllowed),
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Parse("unexpected end of document".to_string()));
        }
        let root = root.ok_or(XmlError::NoRoot)?;

        let mut document = Self {
            nodes,
            root,
            ids: HashMap::new(),
        };
        document.check_prefixes()?;
        document.index_ids()?;
        Ok(document)
    }

    /// The document element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element payload, if `id` is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All children in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    /// Resolves `prefix` (or the default namespace for `None`) in the scope of `id`.
    #[must_use]
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(ns::XML);
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(element) = self.element(node) {
                if let Some((_, uri)) = element
                    .namespace_decls
                    .iter()
                    .find(|(declared, _)| declared.as_deref() == prefix)
                {
                    return if uri.is_empty() { None } else { Some(uri.as_str()) };
                }
            }
            current = self.parent(node);
        }
        None
    }

    /// Namespace URI of an element.
    #[must_use]
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let element = self.element(id)?;
        self.lookup_namespace(id, element.prefix.as_deref())
    }

    /// Namespace URI of an attribute of element `id`. Unprefixed attributes have none.
    #[must_use]
    pub fn attribute_namespace(&self, id: NodeId, attribute: &Attribute) -> Option<&str> {
        attribute
            .prefix
            .as_deref()
            .and_then(|prefix| self.lookup_namespace(id, Some(prefix)))
    }

    /// Returns true if `id` is an element with the given namespace and local name.
    #[must_use]
    pub fn is_element(&self, id: NodeId, namespace: &str, local_name: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.local_name == local_name)
            && self.namespace_uri(id) == Some(namespace)
    }

    /// Value of an unqualified attribute.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|attr| attr.prefix.is_none() && attr.local_name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Value of a namespace qualified attribute.
    #[must_use]
    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local_name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|attr| {
                attr.local_name == local_name
                    && self.attribute_namespace(id, attr) == Some(namespace)
            })
            .map(|attr| attr.value.as_str())
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    /// Element carrying the given ID.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// All elements, in document order, with the given namespace and local name.
    #[must_use]
    pub fn elements_by_name(&self, namespace: &str, local_name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.root, &mut |node| {
            if self.is_element(node, namespace, local_name) {
                found.push(node);
            }
        });
        found
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            match self.kind(node) {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) => pending.extend(self.children(node).iter().rev()),
                NodeKind::Comment(_) | NodeKind::ProcessingInstruction(_) => {}
            }
        }
    }

    /// Visits elements under `id` in document order.
    fn walk(&self, id: NodeId, visit: &mut impl FnMut(NodeId)) {
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            if self.element(node).is_none() {
                continue;
            }
            visit(node);
            pending.extend(self.children(node).iter().rev());
        }
    }

    fn check_prefixes(&self) -> XmlResult<()> {
        let mut result = Ok(());
        self.walk(self.root, &mut |node| {
            if result.is_err() {
                return;
            }
            let Some(element) = self.element(node) else {
                return;
            };
            let prefixes = element
                .prefix
                .iter()
                .chain(element.attributes.iter().filter_map(|attr| attr.prefix.as_ref()));
            for prefix in prefixes {
                if self.lookup_namespace(node, Some(prefix)).is_none() {
                    result = Err(XmlError::UnboundPrefix(prefix.clone()));
                    return;
                }
            }
        });
        result
    }

    fn index_ids(&mut self) -> XmlResult<()> {
        let mut ids: HashMap<String, NodeId> = HashMap::new();
        let mut duplicate: Option<String> = None;
        self.walk(self.root, &mut |node| {
            let Some(element) = self.element(node) else {
                return;
            };
            for attr in &element.attributes {
                if !self.is_id_attribute(node, attr) {
                    continue;
                }
                if ids.insert(attr.value.clone(), node).is_some() && duplicate.is_none() {
                    duplicate = Some(attr.value.clone());
                }
            }
        });
        if let Some(id) = duplicate {
            return Err(XmlError::DuplicateId(id));
        }
        self.ids = ids;
        Ok(())
    }

    fn is_id_attribute(&self, node: NodeId, attr: &Attribute) -> bool {
        match attr.prefix.as_deref() {
            None => attr.local_name == "Id" || attr.local_name == "ID",
            Some(_) => {
                attr.local_name == "Id" && self.attribute_namespace(node, attr) == Some(ns::WSU)
            }
        }
    }
}

fn push_node(nodes: &mut Vec<Node>, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Node {
        kind,
        parent,
        children: Vec::new(),
    });
    if let Some(parent) = parent {
        nodes[parent.0].children.push(id);
    }
    id
}

fn push_element(
    nodes: &mut Vec<Node>,
    start: &BytesStart<'_>,
    parent: Option<NodeId>,
    root: &mut Option<NodeId>,
) -> XmlResult<NodeId> {
    if parent.is_none() && root.is_some() {
        return Err(XmlError::Parse("multiple document elements".to_string()));
    }

    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let (prefix, local_name) = split_qname(&name);

    let mut namespace_decls = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(&normalize_attribute_whitespace(raw))?.into_owned();

        if key == "xmlns" {
            namespace_decls.push((None, value));
        } else if let Some(declared) = key.strip_prefix("xmlns:") {
            namespace_decls.push((Some(declared.to_string()), value));
        } else {
            let (attr_prefix, attr_local) = split_qname(key);
            attributes.push(Attribute {
                prefix: attr_prefix,
                local_name: attr_local,
                value,
            });
        }
    }

    let id = push_node(
        nodes,
        NodeKind::Element(Element {
            prefix,
            local_name,
            namespace_decls,
            attributes,
        }),
        parent,
    );
    if parent.is_none() {
        *root = Some(id);
    }
    Ok(id)
}

fn split_qname(name: &str) -> (Option<String>, String) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.to_string()),
    }
}

fn qualified(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local_name}"),
        None => local_name.to_string(),
    }
}

fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

fn normalize_attribute_whitespace(raw: &str) -> String {
    raw.replace("\r\n", " ").replace(['\t', '\n', '\r'], " ")
}
