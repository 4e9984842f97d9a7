//! Debug printer for nested document trees.
//!
//! Each node prints as `{indent}${kind}$  {text}` and its children follow,
//! indented two more spaces.

use serde_json::Value;
use std::io::{self, Write};

/// A node that can be walked by [`walk`].
pub trait TreeNode {
    fn kind(&self) -> String;
    /// Text content of the node and its descendants.
    fn text(&self) -> String;
    fn children(&self) -> Vec<&Self>;
}

/// Writes `node` and its descendants to `out`.
pub fn walk<N, W>(out: &mut W, indent: &str, node: &N) -> io::Result<()>
where
    N: TreeNode + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "{}${}$  {}", indent, node.kind(), node.text())?;
    let child_indent = format!("{}  ", indent);
    for child in node.children() {
        walk(out, &child_indent, child)?;
    }
    Ok(())
}

/// Walks `node` to stdout.
pub fn print_tree<N: TreeNode + ?Sized>(node: &N) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    walk(&mut out, "", node)?;
    out.flush()
}

/// Owned tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: String,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Builds a tree from JSON. Object members are labelled `key: type`;
    /// container text joins the scalar text of all descendants with spaces.
    pub fn from_json(value: &Value) -> Self {
        Self::from_json_labelled(None, value)
    }

    fn from_json_labelled(key: Option<&str>, value: &Value) -> Self {
        let type_name = json_type(value);
        let kind = match key {
            Some(k) => format!("{}: {}", k, type_name),
            None => type_name.to_string(),
        };
        let children: Vec<Node> = match value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Self::from_json_labelled(Some(k), v))
                .collect(),
            Value::Array(items) => items
                .iter()
                .map(|v| Self::from_json_labelled(None, v))
                .collect(),
            _ => Vec::new(),
        };
        let text = match value {
            Value::Object(_) | Value::Array(_) => children
                .iter()
                .map(|c| c.text.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self {
            kind,
            text,
            children,
        }
    }
}

impl TreeNode for Node {
    fn kind(&self) -> String {
        self.kind.clone()
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

/// Raw JSON: kind is the type name, text is the scalar rendering or the
/// joined text of all descendants.
impl TreeNode for Value {
    fn kind(&self) -> String {
        json_type(self).to_string()
    }

    fn text(&self) -> String {
        match self {
            Value::Object(map) => join_text(map.values()),
            Value::Array(items) => join_text(items.iter()),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn children(&self) -> Vec<&Self> {
        match self {
            Value::Object(map) => map.values().collect(),
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }
}

fn join_text<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(|v| v.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render<N: TreeNode>(node: &N) -> String {
        let mut out = Vec::new();
        walk(&mut out, "", node).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn leaf_prints_one_line() {
        assert_eq!(render(&Node::leaf("p", "hello")), "$p$  hello\n");
    }

    #[test]
    fn children_indent_two_spaces_per_level() {
        let tree = Node {
            kind: "html".to_string(),
            text: "Title Body".to_string(),
            children: vec![
                Node {
                    kind: "head".to_string(),
                    text: "Title".to_string(),
                    children: vec![Node::leaf("title", "Title")],
                },
                Node::leaf("body", "Body"),
            ],
        };
        assert_eq!(
            render(&tree),
            "$html$  Title Body\n  $head$  Title\n    $title$  Title\n  $body$  Body\n"
        );
    }

    #[test]
    fn json_tree_labels_members() {
        let value = json!({ "name": "acme", "tags": ["a", 1], "parent": null });
        let node = Node::from_json(&value);
        assert_eq!(node.kind, "object");
        assert_eq!(node.text, "acme a 1");
        assert_eq!(
            render(&node),
            "$object$  acme a 1\n  $name: string$  acme\n  $parent: null$  \n  $tags: array$  a 1\n    $string$  a\n    $number$  1\n"
        );
    }

    #[test]
    fn raw_json_walks_without_labels() {
        let value = json!({ "a": [true, "x"], "b": 2 });
        assert_eq!(value.text(), "true x 2");
        assert_eq!(
            render(&value),
            "$object$  true x 2\n  $array$  true x\n    $bool$  true\n    $string$  x\n  $number$  2\n"
        );
    }
}
