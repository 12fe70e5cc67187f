//! The document capability the signature validator is written against.
//!
//! Signature checks only need element lookup by ID, structural navigation,
//! qualified-name tests, attribute and text access, and canonicalization.
//! Keeping them behind a trait lets the coverage rules run over any XML model.

use std::fmt::Debug;

use crate::c14n;
use crate::dom::{Document, NodeId, NodeKind};
use crate::error::XmlResult;

/// First significant child of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingChild<N> {
    /// Only whitespace, or nothing at all.
    Empty,
    /// An element.
    Element(N),
    /// Text, a comment or a processing instruction.
    Other,
}

/// Read access to a signed XML document.
pub trait SignedDocument {
    /// Handle to an element. Equal handles denote the same node.
    type Node: Copy + Eq + Debug;

    /// The document element.
    fn document_element(&self) -> Self::Node;

    /// Element carrying the given ID attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Child elements in document order.
    fn child_elements(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Local name of an element.
    fn local_name(&self, node: Self::Node) -> &str;

    /// Namespace URI of an element.
    fn namespace(&self, node: Self::Node) -> Option<&str>;

    /// Unqualified attribute value.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Namespace qualified attribute value.
    fn attribute_ns(&self, node: Self::Node, namespace: &str, local_name: &str) -> Option<&str>;

    /// Concatenated descendant text.
    fn text(&self, node: Self::Node) -> String;

    /// First child node that is not whitespace-only text.
    fn leading_child(&self, node: Self::Node) -> LeadingChild<Self::Node>;

    /// All elements with the given name, in document order.
    fn elements_by_name(&self, namespace: &str, local_name: &str) -> Vec<Self::Node>;

    /// Exclusive canonical form of the subtree at `node`.
    fn canonicalize(&self, node: Self::Node, inclusive_prefixes: &[String]) -> XmlResult<Vec<u8>>;

    /// Returns true if `node` has the given namespace and local name.
    fn is_element(&self, node: Self::Node, namespace: &str, local_name: &str) -> bool {
        self.local_name(node) == local_name && self.namespace(node) == Some(namespace)
    }

    /// Child elements with the given name.
    fn children_named(&self, node: Self::Node, namespace: &str, local_name: &str) -> Vec<Self::Node> {
        self.child_elements(node)
            .into_iter()
            .filter(|child| self.is_element(*child, namespace, local_name))
            .collect()
    }

    /// First child element with the given local name, in any namespace.
    fn child_by_local_name(&self, node: Self::Node, local_name: &str) -> Option<Self::Node> {
        self.child_elements(node)
            .into_iter()
            .find(|child| self.local_name(*child) == local_name)
    }
}

impl SignedDocument for Document {
    type Node = NodeId;

    fn document_element(&self) -> NodeId {
        self.root()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        Document::element_by_id(self, id)
    }

    fn child_elements(&self, node: NodeId) -> Vec<NodeId> {
        Document::child_elements(self, node).collect()
    }

    fn local_name(&self, node: NodeId) -> &str {
        self.element(node).map_or("", |element| element.local_name.as_str())
    }

    fn namespace(&self, node: NodeId) -> Option<&str> {
        self.namespace_uri(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, node, name)
    }

    fn attribute_ns(&self, node: NodeId, namespace: &str, local_name: &str) -> Option<&str> {
        Document::attribute_ns(self, node, namespace, local_name)
    }

    fn text(&self, node: NodeId) -> String {
        self.text_content(node)
    }

    fn leading_child(&self, node: NodeId) -> LeadingChild<NodeId> {
        for child in self.children(node) {
            match self.kind(*child) {
                NodeKind::Text(text) if text.trim().is_empty() => {}
                NodeKind::Element(_) => return LeadingChild::Element(*child),
                _ => return LeadingChild::Other,
            }
        }
        LeadingChild::Empty
    }

    fn elements_by_name(&self, namespace: &str, local_name: &str) -> Vec<NodeId> {
        Document::elements_by_name(self, namespace, local_name)
    }

    fn canonicalize(&self, node: NodeId, inclusive_prefixes: &[String]) -> XmlResult<Vec<u8>> {
        c14n::canonicalize(self, node, inclusive_prefixes)
    }
}
