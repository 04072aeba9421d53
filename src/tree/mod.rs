//! Arena-backed XML element tree using the text/tail model.
//!
//! Every [`Element`] owns two text runs: `text`, which precedes its first
//! child, and `tail`, which follows its own end tag up to the next sibling.
//! Walking `text, child, child.tail, child, child.tail, ...` reproduces the
//! document order of the source. Only elements are arena nodes; text never is.

use indextree::Arena;

mod parse;
mod write;

pub use indextree::NodeId;
pub use parse::ParseOptions;
pub(crate) use write::escape_text;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("document has no root element")]
    Empty,
    #[error("unexpected content outside the root element")]
    TrailingContent,
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("<{0}> has no parent to receive its replacement")]
    NoParent(String),
}

/// Strips a `prefix:` or Clark-notation `{uri}` qualifier from a tag name.
pub fn local_name(name: &str) -> &str {
    let name = match name.rfind('}') {
        Some(end) => &name[end + 1..],
        None => name,
    };
    match name.rfind(':') {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the source.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }
}

/// One step of an element's content in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    Text(&'a str),
    Element(NodeId),
}

#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<Element>,
    root: NodeId,
}

impl std::str::FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root);
        Document { arena, root }
    }

    pub(crate) fn from_parts(arena: Arena<Element>, root: NodeId) -> Self {
        Document { arena, root }
    }

    pub fn parse(src: &str) -> Result<Self, Error> {
        Self::parse_with(src, ParseOptions::default())
    }

    pub fn parse_with(src: &str, options: ParseOptions) -> Result<Self, Error> {
        parse::parse(src, options)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, id: NodeId) -> &Element {
        self.arena[id].get()
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        self.arena[id].get_mut()
    }

    pub fn local_name(&self, id: NodeId) -> &str {
        self.element(id).local_name()
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id).attribute(key)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// Creates a detached element; attach it with [`Document::append_child`].
    pub fn new_element(&mut self, element: Element) -> NodeId {
        self.arena.new_node(element)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.new_element(element);
        self.append_child(parent, id);
        id
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Pre-order walk starting at (and including) `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Every element strictly below `id` whose local name is `name`, in
    /// document order.
    pub fn find_all(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .skip(1)
            .filter(|&d| self.local_name(d) == name)
            .collect()
    }

    pub fn find(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .skip(1)
            .find(|&d| self.local_name(d) == name)
    }

    /// The element's text runs and child elements in document order. Empty
    /// runs are skipped.
    pub fn items(&self, id: NodeId) -> impl Iterator<Item = Item<'_>> + '_ {
        let leading = non_empty(&self.element(id).text).map(Item::Text);
        leading.into_iter().chain(self.children(id).flat_map(move |child| {
            let tail = non_empty(&self.element(child).tail).map(Item::Text);
            std::iter::once(Item::Element(child)).chain(tail)
        }))
    }

    /// True when `id` itself or any of its ancestors has local name `name`.
    pub fn is_inside(&self, id: NodeId, name: &str) -> bool {
        id.ancestors(&self.arena)
            .any(|ancestor| self.local_name(ancestor) == name)
    }

    /// Slash-separated local names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = id
            .ancestors(&self.arena)
            .map(|ancestor| self.local_name(ancestor))
            .collect();
        names.reverse();
        names.join("/")
    }

    /// Removes `id` from the tree, splicing `text` (and the element's tail if
    /// `keep_tail`) into the run that preceded it: the previous sibling's tail,
    /// or the parent's leading text when `id` is the first child.
    pub fn replace_with_text(&mut self, id: NodeId, text: &str, keep_tail: bool) -> Result<(), Error> {
        let parent = self
            .parent(id)
            .ok_or_else(|| Error::NoParent(self.element(id).name.clone()))?;

        let mut merged = text.to_string();
        if keep_tail {
            if let Some(tail) = &self.element(id).tail {
                merged.push_str(tail);
            }
        }

        match self.arena[id].previous_sibling() {
            Some(sibling) => push_run(&mut self.element_mut(sibling).tail, &merged),
            None => push_run(&mut self.element_mut(parent).text, &merged),
        }

        id.detach(&mut self.arena);
        Ok(())
    }

    /// Puts `element` where `id` was. A non-empty tail on the removed element
    /// moves to the replacement.
    pub fn replace_with_element(&mut self, id: NodeId, mut element: Element) -> Result<NodeId, Error> {
        if self.parent(id).is_none() {
            return Err(Error::NoParent(self.element(id).name.clone()));
        }

        if let Some(tail) = non_empty(&self.element(id).tail) {
            element.tail = Some(tail.to_string());
        }

        let new = self.arena.new_node(element);
        id.insert_before(new, &mut self.arena);
        id.detach(&mut self.arena);
        Ok(new)
    }

    /// Serializes `id` and its subtree. The element's own tail is not written.
    pub fn to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        write::write_element(self, id, &mut out);
        out
    }

    /// All text below `id` in document order, tails of descendants included.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for item in self.items(id) {
            match item {
                Item::Text(text) => out.push_str(text),
                Item::Element(child) => out.push_str(&self.text_content(child)),
            }
        }
        out
    }
}

fn non_empty(run: &Option<String>) -> Option<&str> {
    run.as_deref().filter(|text| !text.is_empty())
}

fn push_run(slot: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    slot.get_or_insert_with(String::new).push_str(text);
}
