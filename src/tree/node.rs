//! Radix tree storage: arena-backed nodes and lookup parameters.

use serde::Serialize;

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// An ordered list of URL parameters.
///
/// The order follows the route pattern: the first matched parameter is the
/// first entry, so reading values by index is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(Vec<Param>);

impl Params {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Params(Vec::with_capacity(n))
    }

    pub(crate) fn push(&mut self, key: &str, value: String) {
        self.0.push(Param {
            key: key.to_string(),
            value,
        });
    }

    /// Returns the value of the first parameter whose key matches `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Params(params)
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Stable index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node consumes from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A literal edge label.
    Static,
    /// The top node of a method tree.
    Root,
    /// A `:name` segment consuming exactly one path segment.
    Param,
    /// A `*name` segment consuming the remainder of the path.
    CatchAll,
}

/// One radix tree vertex.
///
/// Static children are addressed through the parallel `indices`/`children`
/// arrays, ordered by descending priority so hot branches are scanned first.
/// A wildcard child is held separately: a node never has both (conflicting
/// registrations are rejected).
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    /// The path substring this node consumes relative to its parent.
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    /// First byte of each static child's label, parallel to `children`.
    pub(crate) indices: Vec<u8>,
    pub(crate) children: Vec<NodeId>,
    /// At most one `Param` or `CatchAll` child.
    pub(crate) wildcard: Option<NodeId>,
    /// Handler chain if a registered route terminates here.
    pub(crate) handlers: Option<Vec<T>>,
    /// Usage counter driving sibling ordering.
    pub(crate) priority: u32,
    /// Maximum number of parameters any route below this node can produce.
    pub(crate) max_params: u8,
    /// The complete pattern this node belongs to, for conflict diagnostics.
    pub(crate) full_path: String,
}

impl<T> Node<T> {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            label: String::new(),
            kind,
            indices: Vec::new(),
            children: Vec::new(),
            wildcard: None,
            handlers: None,
            priority: 0,
            max_params: 0,
            full_path: String::new(),
        }
    }
}

/// A radix tree for one HTTP method.
///
/// Built exclusively through [`Tree::add_route`]; immutable afterwards.
/// Lookups take `&self` and are safe for any number of concurrent readers
/// once registration is complete.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    pub(crate) nodes: Vec<Node<T>>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::new(NodeKind::Root)],
        }
    }

    /// Largest number of parameters any registered route can produce;
    /// lookups pre-size their parameter buffer with this.
    pub fn max_params(&self) -> usize {
        self.nodes[NodeId::ROOT.index()].max_params as usize
    }

    /// All registered patterns in this tree, in arbitrary order.
    pub fn registered_patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let n = self.node(id);
            if n.handlers.is_some() {
                out.push(n.full_path.as_str());
            }
            stack.extend(n.children.iter().copied());
            if let Some(w) = n.wildcard {
                stack.push(w);
            }
        }
        out
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Bumps the priority of the `pos`-th static child of `parent` and swaps
    /// it forward past lower-priority siblings, keeping `indices` aligned.
    /// Returns the child's new position.
    pub(crate) fn increment_child_prio(&mut self, parent: NodeId, pos: usize) -> usize {
        let child = self.node(parent).children[pos];
        self.node_mut(child).priority += 1;
        let prio = self.node(child).priority;

        let mut new_pos = pos;
        while new_pos > 0 {
            let prev = self.node(parent).children[new_pos - 1];
            // equal priorities keep their registration order
            if self.node(prev).priority >= prio {
                break;
            }
            let n = self.node_mut(parent);
            n.children.swap(new_pos - 1, new_pos);
            n.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::new()
    }
}

#[cfg(test)]
impl<T> Tree<T> {
    /// Asserts the structural invariants over the whole arena: aligned and
    /// unique child indices, priority-descending sibling order, and the
    /// static/wildcard exclusivity rule.
    pub(crate) fn check_invariants(&self) {
        for (i, n) in self.nodes.iter().enumerate() {
            assert_eq!(
                n.indices.len(),
                n.children.len(),
                "node {i}: indices/children misaligned"
            );
            let mut seen = std::collections::HashSet::new();
            for &b in &n.indices {
                assert!(seen.insert(b), "node {i}: duplicate child index byte");
            }
            assert!(
                n.children.is_empty() || n.wildcard.is_none(),
                "node {i}: has both static children and a wildcard child"
            );
            let prios: Vec<u32> = n
                .children
                .iter()
                .map(|&c| self.node(c).priority)
                .collect();
            for w in prios.windows(2) {
                assert!(w[0] >= w[1], "node {i}: children not priority-ordered");
            }
            for (pos, &c) in n.children.iter().enumerate() {
                let child = self.node(c);
                if !child.label.is_empty() {
                    assert_eq!(
                        child.label.as_bytes()[0],
                        n.indices[pos],
                        "node {i}: index byte does not match child label"
                    );
                }
            }
        }
    }
}
