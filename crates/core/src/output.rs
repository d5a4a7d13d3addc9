//! Owned result tree produced by command execution.
//!
//! Each executed command appends one [`OutputNode`] to a caller-supplied
//! parent. Nodes own their children outright, so a node can only ever hang
//! off a single parent: `attach` takes the child by value.

use serde::{Deserialize, Serialize};

use crate::value::{Value, DEFAULT_DELIMITER};

/// A node in the result tree: an optional value, owned children and the
/// delimiter used when the node is flattened to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputNode {
    value: Option<Value>,
    children: Vec<OutputNode>,
    delimiter: String,
}

impl Default for OutputNode {
    fn default() -> Self {
        Self::root(DEFAULT_DELIMITER)
    }
}

impl OutputNode {
    /// A value-less node, typically the top of a caller's result tree.
    pub fn root(delimiter: impl Into<String>) -> Self {
        Self {
            value: None,
            children: Vec::new(),
            delimiter: delimiter.into(),
        }
    }

    /// A childless node holding `value`.
    pub fn leaf(value: Value, delimiter: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            children: Vec::new(),
            delimiter: delimiter.into(),
        }
    }

    /// An array-style node.
    ///
    /// For `Array`/`Set` values every element is wrapped in its own leaf
    /// child, in element order. Any other value yields a plain leaf.
    pub fn array(value: Value, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        let children = match &value {
            Value::Array(items) => items
                .iter()
                .map(|v| OutputNode::leaf(v.clone(), delimiter.clone()))
                .collect(),
            Value::Set(set) => set
                .iter()
                .map(|v| OutputNode::leaf(v.clone(), delimiter.clone()))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            value: Some(value),
            children,
            delimiter,
        }
    }

    /// Append a child, returning a reference to it in its new position.
    pub fn attach(&mut self, child: OutputNode) -> &mut OutputNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// The node's own value
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Children in insertion order
    pub fn children(&self) -> &[OutputNode] {
        &self.children
    }

    /// Flattening delimiter
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// True for nodes built by [`OutputNode::array`] from a sequence value.
    pub fn is_array(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_sequence)
    }

    /// Values of the direct children, skipping value-less ones.
    pub fn child_values(&self) -> Vec<&Value> {
        self.children.iter().filter_map(OutputNode::value).collect()
    }

    /// Most recently attached child
    pub fn last_child(&self) -> Option<&OutputNode> {
        self.children.last()
    }

    /// Flatten to text.
    ///
    /// A valued node renders its value with its own delimiter; a value-less
    /// node joins its children's renderings.
    pub fn to_display_string(&self) -> String {
        match &self.value {
            Some(v) => v.to_delimited_string(&self.delimiter),
            None => self
                .children
                .iter()
                .map(OutputNode::to_display_string)
                .collect::<Vec<_>>()
                .join(&self.delimiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SetValue;

    #[test]
    fn test_array_node_children_preserve_order() {
        let arr = Value::Array(vec![Value::from("x"), Value::from("y"), Value::from("z")]);
        let node = OutputNode::array(arr, " ");
        assert!(node.is_array());
        let back: Vec<&str> = node
            .child_values()
            .into_iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(back, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_array_node_from_scalar_is_leaf() {
        let node = OutputNode::array(Value::Int(5), " ");
        assert!(!node.is_array());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_set_node_one_child_per_member() {
        let set: SetValue = vec![Value::from("a"), Value::from("a"), Value::from("b")]
            .into_iter()
            .collect();
        let node = OutputNode::array(Value::Set(set), " ");
        assert_eq!(node.children().len(), 2);
    }

    #[test]
    fn test_attach_in_insertion_order() {
        let mut root = OutputNode::root(",");
        root.attach(OutputNode::leaf(Value::from("1"), ","));
        root.attach(OutputNode::leaf(Value::from("2"), ","));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.last_child().unwrap().value(), Some(&Value::from("2")));
        assert_eq!(root.to_display_string(), "1,2");
    }

    #[test]
    fn test_attach_returns_child_for_nesting() {
        let mut root = OutputNode::default();
        let child = root.attach(OutputNode::root(" "));
        child.attach(OutputNode::leaf(Value::Int(1), " "));
        assert_eq!(root.children()[0].children().len(), 1);
    }
}
