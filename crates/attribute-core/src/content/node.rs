//! Typed content tree and image-item traversal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use toml::value::Datetime;

/// Key that marks a record as an image item.
pub const SRC_KEY: &str = "src";
/// Key the extracted metadata is written to.
pub const METADATA_KEY: &str = "metadata";
/// Key the thumbhash is written to.
pub const THUMBHASH_KEY: &str = "thumbhash";

/// A record: string keys to nested content.
pub type Record = BTreeMap<String, ContentNode>;

/// One node of a content record.
///
/// Serializes exactly like the JSON value it was built from. TOML dates are
/// kept as [`ContentNode::Datetime`] so they are written back as dates; in
/// JSON they serialize as their TOML text (`"2024-05-01"`).
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// Null, boolean, number, or string
    Scalar(Value),
    /// TOML date, time, or date-time
    Datetime(Datetime),
    /// Ordered list of nodes
    List(Vec<ContentNode>),
    /// Keyed record
    Record(Record),
}

/// Location and source path of one image item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// JSON pointer to the image record ("" for the root)
    pub pointer: String,
    /// The record's `src` value
    pub src: String,
}

impl From<Value> for ContentNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            scalar => Self::Scalar(scalar),
        }
    }
}

impl From<ContentNode> for Value {
    fn from(node: ContentNode) -> Self {
        match node {
            ContentNode::Scalar(value) => value,
            ContentNode::Datetime(datetime) => Value::String(datetime.to_string()),
            ContentNode::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            ContentNode::Record(record) => Value::Object(
                record
                    .into_iter()
                    .map(|(key, node)| (key, Value::from(node)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ContentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(value) => value.serialize(serializer),
            Self::Datetime(datetime) => serializer.collect_str(datetime),
            Self::List(items) => serializer.collect_seq(items),
            Self::Record(record) => serializer.collect_map(record),
        }
    }
}

impl<'de> Deserialize<'de> for ContentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for ContentNode {
    fn from(s: &str) -> Self {
        Self::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for ContentNode {
    fn from(s: String) -> Self {
        Self::Scalar(Value::String(s))
    }
}

impl ContentNode {
    /// The `src` of this node if it is an image item.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            Self::Record(record) => record_src(record),
            _ => None,
        }
    }

    /// Child of a record by key.
    pub fn get(&self, key: &str) -> Option<&ContentNode> {
        match self {
            Self::Record(record) => record.get(key),
            _ => None,
        }
    }

    /// String value of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a node by JSON pointer (RFC 6901).
    pub fn pointer(&self, pointer: &str) -> Option<&ContentNode> {
        if pointer.is_empty() {
            return Some(self);
        }
        let rest = pointer.strip_prefix('/')?;
        rest.split('/').map(unescape_token).try_fold(self, |node, token| match node {
            Self::Record(record) => record.get(&token),
            Self::List(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Scalar(_) | Self::Datetime(_) => None,
        })
    }

    /// Every image item in the tree, children before the records containing them.
    pub fn image_refs(&self) -> Vec<ImageRef> {
        let mut refs = Vec::new();
        let mut pointer = String::new();
        collect_refs(self, &mut pointer, &mut refs);
        refs
    }

    /// Call `visit` with the pointer and record of every image item.
    ///
    /// Same order as [`ContentNode::image_refs`].
    pub fn visit_images_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&str, &mut Record),
    {
        let mut pointer = String::new();
        walk_mut(self, &mut pointer, &mut visit);
    }
}

/// The `src` of a record if it is an image item.
pub fn record_src(record: &Record) -> Option<&str> {
    record.get(SRC_KEY).and_then(ContentNode::as_str)
}

fn collect_refs(node: &ContentNode, pointer: &mut String, refs: &mut Vec<ImageRef>) {
    match node {
        ContentNode::Scalar(_) | ContentNode::Datetime(_) => {}
        ContentNode::List(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                push_token(pointer, &index.to_string());
                collect_refs(item, pointer, refs);
                pointer.truncate(len);
            }
        }
        ContentNode::Record(record) => {
            for (key, child) in record {
                let len = pointer.len();
                push_token(pointer, key);
                collect_refs(child, pointer, refs);
                pointer.truncate(len);
            }
            if let Some(src) = record_src(record) {
                refs.push(ImageRef {
                    pointer: pointer.clone(),
                    src: src.to_string(),
                });
            }
        }
    }
}

fn walk_mut<F>(node: &mut ContentNode, pointer: &mut String, visit: &mut F)
where
    F: FnMut(&str, &mut Record),
{
    match node {
        ContentNode::Scalar(_) | ContentNode::Datetime(_) => {}
        ContentNode::List(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                let len = pointer.len();
                push_token(pointer, &index.to_string());
                walk_mut(item, pointer, visit);
                pointer.truncate(len);
            }
        }
        ContentNode::Record(record) => {
            for (key, child) in record.iter_mut() {
                let len = pointer.len();
                push_token(pointer, key);
                walk_mut(child, pointer, visit);
                pointer.truncate(len);
            }
            if record_src(record).is_some() {
                visit(pointer, record);
            }
        }
    }
}

fn push_token(pointer: &mut String, token: &str) {
    pointer.push('/');
    for c in token.chars() {
        match c {
            '~' => pointer.push_str("~0"),
            '/' => pointer.push_str("~1"),
            c => pointer.push(c),
        }
    }
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
