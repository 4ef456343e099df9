//! The tree the renderer builds into.
//!
//! [`Document`] is the small set of primitives the compiler and renderer need.
//! [`MemoryDocument`] implements it over slotmap storage; it is what tests and
//! headless rendering use.

use std::{cell::RefCell, fmt::Write as _};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use strand_reactive::{Callback, Value};

use crate::markup::is_void;

new_key_type! {
    /// Identifies one node of a [`Document`].
    pub struct NodeId;
}

/// Node creation and mutation primitives.
///
/// Handlers are keyed by event name without the `on` prefix.
pub trait Document {
    fn create_element(&self, tag: &str) -> NodeId;
    fn create_text(&self, text: &str) -> NodeId;
    fn set_text(&self, node: NodeId, text: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&self, node: NodeId, name: &str);
    fn set_handler(&self, node: NodeId, event: &str, handler: Option<Callback>);

    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn append_child(&self, parent: NodeId, child: NodeId);
    /// Put `new` where `old` is, detaching `old`.
    fn replace_child(&self, parent: NodeId, new: NodeId, old: NodeId);
    fn remove_child(&self, parent: NodeId, child: NodeId);
    /// Detach `node` and release it with all of its descendants. Ids of
    /// dropped nodes are dead afterwards.
    fn drop_node(&self, node: NodeId);

    /// The current value of a form control.
    fn value(&self, node: NodeId) -> String;
    fn set_value(&self, node: NodeId, value: &str);
}

enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        handlers: FxHashMap<String, Callback>,
        value: String,
    },
    Text(String),
}

#[derive(Default)]
struct DocumentStorage {
    node_ids: SlotMap<NodeId, ()>,
    nodes: SecondaryMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, Option<NodeId>>,
}

impl DocumentStorage {
    fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.node_ids.insert(());
        self.nodes.insert(id, data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, None);
        id
    }

    fn element_mut(&mut self, node: NodeId) -> Option<ElementMut<'_>> {
        match self.nodes.get_mut(node)? {
            NodeData::Element {
                attributes,
                handlers,
                value,
                ..
            } => Some(ElementMut {
                attributes,
                handlers,
                value,
            }),
            NodeData::Text(_) => None,
        }
    }

    /// Remove `node` and its subtree from every table. The removed data is
    /// handed back so handlers are dropped outside the borrow.
    fn release(&mut self, node: NodeId, released: &mut Vec<NodeData>) {
        for child in self.children.remove(node).unwrap_or_default() {
            self.release(child, released);
        }
        self.parent.remove(node);
        self.node_ids.remove(node);
        if let Some(data) = self.nodes.remove(node) {
            released.push(data);
        }
    }

    fn is_live(&self, node: NodeId) -> bool {
        self.node_ids.contains_key(node)
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(Some(parent)) = self.parent.insert(child, None) {
            if let Some(children) = self.children.get_mut(parent) {
                children.retain(|c| *c != child);
            }
        }
    }
}

struct ElementMut<'a> {
    attributes: &'a mut Vec<(String, String)>,
    handlers: &'a mut FxHashMap<String, Callback>,
    value: &'a mut String,
}

/// An in-memory document.
#[derive(Default)]
pub struct MemoryDocument {
    storage: RefCell<DocumentStorage>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.storage.borrow().node_ids.len()
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        match self.storage.borrow().nodes.get(node)? {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.storage.borrow().parent.get(node).copied().flatten()
    }

    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.storage.borrow().nodes.get(node) {
            Some(NodeData::Element { attributes, .. }) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    pub fn has_handler(&self, node: NodeId, event: &str) -> bool {
        matches!(
            self.storage.borrow().nodes.get(node),
            Some(NodeData::Element { handlers, .. }) if handlers.contains_key(event)
        )
    }

    /// Element children only, skipping text nodes.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        let storage = self.storage.borrow();
        storage
            .children
            .get(node)
            .into_iter()
            .flatten()
            .copied()
            .filter(|child| matches!(storage.nodes.get(*child), Some(NodeData::Element { .. })))
            .collect()
    }

    /// Invoke the handler registered for `event` on `node`. Returns `false` if
    /// there is none.
    pub fn dispatch(&self, node: NodeId, event: &str) -> bool {
        let handler = match self.storage.borrow().nodes.get(node) {
            Some(NodeData::Element { handlers, .. }) => handlers.get(event).cloned(),
            _ => None,
        };
        let Some(handler) = handler else {
            return false;
        };
        tracing::trace!(?node, event, "dispatching event");
        handler.call(&[Value::from(event)]);
        true
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(NodeData::Text(text)) = self.storage.borrow().nodes.get(node) {
            out.push_str(text);
            return;
        }
        for child in self.children(node) {
            self.collect_text(child, out);
        }
    }

    /// Serialize `node` and its descendants. Void elements have no closing
    /// tag. Form control values and handlers are not part of the markup.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let tag = {
            let storage = self.storage.borrow();
            match storage.nodes.get(node) {
                Some(NodeData::Text(text)) => {
                    out.push_str(&escape(text, false));
                    return;
                }
                Some(NodeData::Element {
                    tag, attributes, ..
                }) => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attributes {
                        if value.is_empty() {
                            let _ = write!(out, " {name}");
                        } else {
                            let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                        }
                    }
                    out.push('>');
                    tag.clone()
                }
                None => return,
            }
        };
        if is_void(&tag) {
            return;
        }
        for child in self.children(node) {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{tag}>");
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl Document for MemoryDocument {
    fn create_element(&self, tag: &str) -> NodeId {
        self.storage.borrow_mut().insert(NodeData::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            handlers: FxHashMap::default(),
            value: String::new(),
        })
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.storage
            .borrow_mut()
            .insert(NodeData::Text(text.to_string()))
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(NodeData::Text(current)) = self.storage.borrow_mut().nodes.get_mut(node) {
            current.clear();
            current.push_str(text);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match self.storage.borrow().nodes.get(node)? {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            NodeData::Text(_) => None,
        }
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut storage = self.storage.borrow_mut();
        let Some(element) = storage.element_mut(node) else {
            return;
        };
        match element.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) => *current = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(element) = self.storage.borrow_mut().element_mut(node) {
            element.attributes.retain(|(n, _)| n != name);
        }
    }

    fn set_handler(&self, node: NodeId, event: &str, handler: Option<Callback>) {
        let mut storage = self.storage.borrow_mut();
        let Some(element) = storage.element_mut(node) else {
            return;
        };
        match handler {
            Some(handler) => {
                element.handlers.insert(event.to_string(), handler);
            }
            None => {
                element.handlers.remove(event);
            }
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.storage
            .borrow()
            .children
            .get(node)
            .cloned()
            .unwrap_or_default()
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut storage = self.storage.borrow_mut();
        if !storage.is_live(child) {
            return;
        }
        storage.detach(child);
        if let Some(children) = storage.children.get_mut(parent) {
            children.push(child);
            storage.parent.insert(child, Some(parent));
        }
    }

    fn replace_child(&self, parent: NodeId, new: NodeId, old: NodeId) {
        let mut storage = self.storage.borrow_mut();
        if !storage.is_live(new) {
            return;
        }
        storage.detach(new);
        let Some(position) = storage
            .children
            .get(parent)
            .and_then(|children| children.iter().position(|c| *c == old))
        else {
            return;
        };
        if let Some(children) = storage.children.get_mut(parent) {
            children[position] = new;
        }
        storage.parent.insert(old, None);
        storage.parent.insert(new, Some(parent));
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) {
        let mut storage = self.storage.borrow_mut();
        if storage.parent.get(child).copied().flatten() == Some(parent) {
            storage.detach(child);
        }
    }

    fn drop_node(&self, node: NodeId) {
        let mut released = Vec::new();
        {
            let mut storage = self.storage.borrow_mut();
            if !storage.is_live(node) {
                return;
            }
            storage.detach(node);
            storage.release(node, &mut released);
        }
        tracing::trace!(?node, released = released.len(), "nodes dropped");
        drop(released);
    }

    fn value(&self, node: NodeId) -> String {
        match self.storage.borrow().nodes.get(node) {
            Some(NodeData::Element { value, .. }) => value.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&self, node: NodeId, value: &str) {
        if let Some(element) = self.storage.borrow_mut().element_mut(node) {
            element.value.clear();
            element.value.push_str(value);
        }
    }
}
