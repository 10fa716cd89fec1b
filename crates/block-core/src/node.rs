use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Attrs = BTreeMap<String, Value>;
pub type ElementKind = String;

const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta"];

/// Rendered element tree handed to the host for mounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Void(VoidNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(&el.kind),
            Node::Void(v) => Some(&v.kind),
            Node::Text(_) => None,
        }
    }

    pub fn attrs(&self) -> Option<&Attrs> {
        match self {
            Node::Element(el) => Some(&el.attrs),
            Node::Void(v) => Some(&v.attrs),
            Node::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs().and_then(|attrs| attrs.get(name))
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|v| v.as_str())
    }

    pub fn is_disabled(&self) -> bool {
        self.attr("disabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.attr("style")
            .and_then(|v| v.get(property))
            .and_then(|v| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_str("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Void(_) | Node::Text(_) => &[],
        }
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Node> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_class(class))
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&Node> {
        fn walk<'a>(node: &'a Node, class: &str, out: &mut Vec<&'a Node>) {
            if node.has_class(class) {
                out.push(node);
            }
            for child in node.children() {
                walk(child, class, out);
            }
        }

        let mut out = Vec::new();
        walk(self, class, &mut out);
        out
    }

    pub fn find_by_kind(&self, kind: &str) -> Option<&Node> {
        if self.kind() == Some(kind) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_kind(kind))
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.text.clone(),
            Node::Void(_) => String::new(),
            Node::Element(el) => el.children.iter().map(Node::text_content).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::default(),
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        let class = class.as_ref().trim();
        if class.is_empty() {
            return self;
        }
        let merged = match self.attrs.get("class").and_then(|v| v.as_str()) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), Value::String(merged));
        self
    }

    pub fn class_if(self, condition: bool, class: impl AsRef<str>) -> Self {
        if condition {
            self.class(class)
        } else {
            self
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .attrs
            .entry("style".to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(map) = entry {
            map.insert(property.into(), Value::String(value.into()));
        }
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }

    pub fn build(self) -> Node {
        if self.children.is_empty() && VOID_TAGS.contains(&self.kind.as_str()) {
            Node::Void(VoidNode {
                kind: self.kind,
                attrs: self.attrs,
            })
        } else {
            Node::Element(self)
        }
    }
}

impl From<ElementNode> for Node {
    fn from(value: ElementNode) -> Self {
        value.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

/// Builds an element with the given classes and attributes.
pub fn make<I, K>(tag: &str, classes: &[&str], attrs: I) -> ElementNode
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut element = ElementNode::new(tag);
    for class in classes {
        element = element.class(class);
    }
    for (name, value) in attrs {
        element.attrs.insert(name.into(), value);
    }
    element
}
