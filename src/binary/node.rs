//! In-memory stanza tree: one protocol unit as a tag, ordered attributes,
//! and either child nodes or a raw byte payload.

use std::fmt;

/// Ordered attribute list with unique keys.
///
/// A `Vec` keeps insertion order and is faster than a map for the small
/// attribute counts stanzas carry (typically 3-6). Lookup is exact-key and
/// case-sensitive; the first match wins if a key is duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attrs(pub Vec<(String, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Insert a key-value pair, replacing the value if the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(pos) = self.0.iter().position(|(k, _)| k == &key) {
            self.0[pos].1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// Node content: a stanza conventionally carries either children or a
/// payload, not both, though the shape does not forbid it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Bytes(Vec<u8>),
    Nodes(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub tag: String,
    pub attrs: Attrs,
    pub content: Option<NodeContent>,
}

impl Node {
    pub fn new(tag: impl Into<String>, attrs: Attrs, content: Option<NodeContent>) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            content,
        }
    }

    /// Dispatch-key comparison: tag equality is ASCII case-insensitive.
    pub fn tag_equals(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    /// Attribute value, or `""` when absent. Inbound stanzas omit optional
    /// attributes freely, so most extraction sites want this form.
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attrs.get(key).unwrap_or("")
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.get(key).and_then(|v| v.parse().ok())
    }

    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attrs.get(key).and_then(|v| v.parse().ok())
    }

    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attrs.get(key).and_then(|v| v.parse().ok())
    }

    pub fn children(&self) -> Option<&[Node]> {
        match &self.content {
            Some(NodeContent::Nodes(nodes)) => Some(nodes),
            _ => None,
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children().and_then(|c| c.first())
    }

    pub fn get_optional_child(&self, tag: &str) -> Option<&Node> {
        self.children()
            .and_then(|nodes| nodes.iter().find(|node| node.tag == tag))
    }

    pub fn get_children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children()
            .into_iter()
            .flatten()
            .filter(move |c| c.tag == tag)
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match &self.content {
            Some(NodeContent::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Payload decoded as UTF-8 text, lossily. Empty string when there is no
    /// byte payload.
    pub fn payload_string(&self) -> String {
        match self.payload() {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => String::new(),
        }
    }
}

/// XML-ish dump used for logging and for unsupported-stanza faults.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (k, v) in self.attrs.iter() {
            write!(f, " {}=\"{}\"", k, v)?;
        }
        match &self.content {
            None => write!(f, "/>"),
            Some(NodeContent::Bytes(bytes)) => {
                write!(f, ">{}</{}>", hex::encode(bytes), self.tag)
            }
            Some(NodeContent::Nodes(children)) => {
                write!(f, ">")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, "</{}>", self.tag)
            }
        }
    }
}
