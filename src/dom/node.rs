//! Intermediate node representation
//!
//! One node per element: raw name, attributes in document order, direct text
//! segments and owned children. Nothing is folded at this stage.

/// An element in the intermediate tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateNode {
    /// Tag name, prefix included
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order, owned by this node
    pub children: Vec<IntermediateNode>,
    /// Direct text segments in document order, untrimmed
    pub text: Vec<String>,
}

impl IntermediateNode {
    pub fn new(name: impl Into<String>) -> Self {
        IntermediateNode {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: Vec::new(),
        }
    }

    /// Whether any child element or text has been recorded.
    /// Attributes may only be added before this turns true.
    #[inline]
    pub fn has_content(&self) -> bool {
        !self.children.is_empty() || !self.text.is_empty()
    }

    /// Concatenated direct text, untrimmed
    pub fn text_content(&self) -> String {
        self.text.concat()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of elements in this subtree, this node included
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Iterative drop: deep trees must not recurse once per level.
impl Drop for IntermediateNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_flags() {
        let mut node = IntermediateNode::new("item");
        assert!(!node.has_content());
        node.attributes.push(("id".into(), "1".into()));
        assert!(!node.has_content());
        node.text.push(" ".into());
        assert!(node.has_content());
        assert_eq!(node.attribute("id"), Some("1"));
        assert_eq!(node.attribute("missing"), None);
    }

    #[test]
    fn test_text_content() {
        let mut node = IntermediateNode::new("p");
        node.text.push("a ".into());
        node.text.push("b".into());
        assert_eq!(node.text_content(), "a b");
    }

    #[test]
    fn test_subtree_size() {
        let mut root = IntermediateNode::new("a");
        let mut b = IntermediateNode::new("b");
        b.children.push(IntermediateNode::new("c"));
        root.children.push(b);
        root.children.push(IntermediateNode::new("d"));
        assert_eq!(root.subtree_size(), 4);
    }

    #[test]
    fn test_deep_tree_drops() {
        let mut node = IntermediateNode::new("leaf");
        for _ in 0..200_000 {
            let mut parent = IntermediateNode::new("n");
            parent.children.push(node);
            node = parent;
        }
        drop(node);
    }
}
