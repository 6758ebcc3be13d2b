//! Route insertion.
//!
//! # Responsibilities
//! - Extend a tree with a pattern, splitting edges on the longest common prefix
//! - Validate wildcard placement before touching the tree
//! - Reject ambiguous or duplicate registrations with a structured conflict
//!
//! # Design Decisions
//! - Syntax errors (malformed wildcards, misplaced catch-alls) are detected
//!   up front so they never leave a half-inserted pattern behind
//! - Conflicts are values, not panics; registration is a startup activity
//!   and the caller decides how to abort

use crate::error::{ConflictKind, RouteError};

use super::node::{Node, NodeId, NodeKind, Tree};

impl<T> Tree<T> {
    /// Registers `pattern` with its handler chain.
    ///
    /// Not safe for concurrent use; all registration must complete before
    /// lookups begin. On a conflict error the tree may have accumulated
    /// priority bumps for the rejected pattern, so a failed registration
    /// should abort startup rather than be retried.
    pub fn add_route(&mut self, pattern: &str, handlers: Vec<T>) -> Result<(), RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::PatternNotAbsolute {
                pattern: pattern.to_string(),
            });
        }
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlerChain {
                pattern: pattern.to_string(),
            });
        }
        validate_pattern(pattern)?;

        let full_path = pattern;
        let mut num_params = count_params(pattern);

        {
            let root = self.node_mut(NodeId::ROOT);
            root.priority += 1;
            if num_params > root.max_params {
                root.max_params = num_params;
            }
        }

        // Empty tree: the root consumes the whole pattern.
        let root_is_blank = {
            let root = self.node(NodeId::ROOT);
            root.label.is_empty()
                && root.children.is_empty()
                && root.wildcard.is_none()
                && root.handlers.is_none()
        };
        if root_is_blank {
            return self.insert_child(NodeId::ROOT, num_params, pattern, full_path, handlers);
        }

        let mut cur = NodeId::ROOT;
        let mut path = pattern;
        let mut consumed = 0;

        loop {
            if num_params > self.node(cur).max_params {
                self.node_mut(cur).max_params = num_params;
            }

            let i = longest_common_prefix(path, &self.node(cur).label);

            // The label extends past the common prefix: split the edge. The
            // new child takes over the unmatched suffix together with the
            // node's children, handlers and priority.
            if i < self.node(cur).label.len() {
                let (child, idx_byte) = {
                    let n = self.node_mut(cur);
                    let suffix = n.label.split_off(i);
                    let idx_byte = suffix.as_bytes()[0];
                    let child = Node {
                        label: suffix,
                        kind: NodeKind::Static,
                        indices: std::mem::take(&mut n.indices),
                        children: std::mem::take(&mut n.children),
                        wildcard: n.wildcard.take(),
                        handlers: n.handlers.take(),
                        priority: n.priority - 1,
                        max_params: 0,
                        full_path: std::mem::take(&mut n.full_path),
                    };
                    (child, idx_byte)
                };
                let child_max = child
                    .children
                    .iter()
                    .chain(child.wildcard.iter())
                    .map(|&id| self.node(id).max_params)
                    .max()
                    .unwrap_or(0);
                let child = Node {
                    max_params: child_max,
                    ..child
                };
                let cid = self.alloc(child);
                let n = self.node_mut(cur);
                n.indices = vec![idx_byte];
                n.children = vec![cid];
                n.full_path = full_path[..consumed + i].to_string();
            }

            if i == path.len() {
                // The pattern terminates exactly at this node.
                if self.node(cur).handlers.is_some() {
                    return Err(RouteError::conflict(
                        ConflictKind::Duplicate,
                        full_path,
                        &self.node(cur).full_path,
                    ));
                }
                let n = self.node_mut(cur);
                n.handlers = Some(handlers);
                n.full_path = full_path.to_string();
                return Ok(());
            }

            path = &path[i..];

            // An existing wildcard child owns this branch point; the rest of
            // the pattern must continue into the same wildcard.
            if let Some(wc) = self.node(cur).wildcard {
                consumed += self.node(cur).label.len();
                cur = wc;
                self.node_mut(cur).priority += 1;
                if num_params > self.node(cur).max_params {
                    self.node_mut(cur).max_params = num_params;
                }
                num_params = num_params.saturating_sub(1);

                let wnode = self.node(cur);
                let label_len = wnode.label.len();
                let compatible = wnode.kind != NodeKind::CatchAll
                    && path.as_bytes().starts_with(wnode.label.as_bytes())
                    && (label_len == path.len() || path.as_bytes()[label_len] == b'/');
                if compatible {
                    continue;
                }

                let kind = if next_is_wildcard(path) {
                    ConflictKind::AmbiguousWildcard
                } else {
                    ConflictKind::WildcardStatic
                };
                let existing = wnode.full_path.clone();
                return Err(RouteError::conflict(kind, full_path, &existing));
            }

            let c = path.as_bytes()[0];

            // Continue into an existing static child selected by first byte.
            if let Some(pos) = self.node(cur).indices.iter().position(|&b| b == c) {
                consumed += self.node(cur).label.len();
                let pos = self.increment_child_prio(cur, pos);
                cur = self.node(cur).children[pos];
                continue;
            }

            // No child matches; grow the tree with the remainder.
            if c != b':' && c != b'*' {
                let mut child = Node::new(NodeKind::Static);
                child.max_params = num_params;
                child.full_path = full_path.to_string();
                let cid = self.alloc(child);
                let n = self.node_mut(cur);
                n.indices.push(c);
                n.children.push(cid);
                let pos = n.children.len() - 1;
                self.increment_child_prio(cur, pos);
                cur = cid;
            }
            return self.insert_child(cur, num_params, path, full_path, handlers);
        }
    }

    /// Fills `cur` (a node without an established subtree) with the rest of
    /// the pattern, creating Param/CatchAll nodes for each wildcard segment.
    fn insert_child(
        &mut self,
        mut cur: NodeId,
        mut num_params: u8,
        mut path: &str,
        full_path: &str,
        handlers: Vec<T>,
    ) -> Result<(), RouteError> {
        while let Some((wildcard, i, _)) = find_wildcard(path) {
            // A wildcard here would make the node's existing subtree
            // unreachable.
            if !self.node(cur).children.is_empty() || self.node(cur).wildcard.is_some() {
                let detail = self.node(cur).full_path.clone();
                return Err(RouteError::conflict(
                    ConflictKind::WildcardStatic,
                    full_path,
                    &detail,
                ));
            }

            if wildcard.as_bytes()[0] == b':' {
                if i > 0 {
                    // static prefix before the wildcard
                    self.node_mut(cur).label = path[..i].to_string();
                    path = &path[i..];
                }

                let mut child = Node::new(NodeKind::Param);
                child.label = wildcard.to_string();
                child.max_params = num_params;
                child.priority = 1;
                child.full_path = full_path.to_string();
                let cid = self.alloc(child);
                self.node_mut(cur).wildcard = Some(cid);
                cur = cid;
                num_params = num_params.saturating_sub(1);

                if wildcard.len() < path.len() {
                    // the route continues below this segment
                    path = &path[wildcard.len()..];
                    let mut next = Node::new(NodeKind::Static);
                    next.max_params = num_params;
                    next.priority = 1;
                    next.full_path = full_path.to_string();
                    let nid = self.alloc(next);
                    let n = self.node_mut(cur);
                    n.indices.push(path.as_bytes()[0]);
                    n.children.push(nid);
                    cur = nid;
                    continue;
                }

                self.node_mut(cur).handlers = Some(handlers);
                return Ok(());
            }

            // Catch-all. The preceding '/' may already belong to this node's
            // label, in which case the catch-all would shadow the segment
            // root.
            if i == 0 {
                let detail = self.node(cur).full_path.clone();
                return Err(RouteError::conflict(
                    ConflictKind::WildcardStatic,
                    full_path,
                    &detail,
                ));
            }

            // Keep the leading slash on the catch-all node so captured
            // values retain it.
            let slash = i - 1;
            self.node_mut(cur).label = path[..slash].to_string();

            let mut child = Node::new(NodeKind::CatchAll);
            child.label = path[slash..].to_string();
            child.max_params = 1;
            child.priority = 1;
            child.handlers = Some(handlers);
            child.full_path = full_path.to_string();
            let cid = self.alloc(child);
            self.node_mut(cur).wildcard = Some(cid);
            return Ok(());
        }

        // No wildcard left: the rest is a plain static suffix.
        let n = self.node_mut(cur);
        n.label = path.to_string();
        n.handlers = Some(handlers);
        n.full_path = full_path.to_string();
        Ok(())
    }
}

fn count_params(pattern: &str) -> u8 {
    pattern
        .bytes()
        .filter(|&b| b == b':' || b == b'*')
        .count()
        .min(255) as u8
}

fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Whether the remaining pattern starts a wildcard at the current branch
/// point (used only to pick a conflict kind for diagnostics).
fn next_is_wildcard(path: &str) -> bool {
    let p = path.strip_prefix('/').unwrap_or(path);
    p.starts_with(':') || p.starts_with('*')
}

/// Finds the next wildcard segment and reports whether it is well-formed.
/// A wildcard is invalid when its segment holds a second `:` or `*` marker.
fn find_wildcard(path: &str) -> Option<(&str, usize, bool)> {
    for (start, c) in path.bytes().enumerate() {
        if c != b':' && c != b'*' {
            continue;
        }
        let mut valid = true;
        for (off, c) in path[start + 1..].bytes().enumerate() {
            match c {
                b'/' => return Some((&path[start..start + 1 + off], start, valid)),
                b':' | b'*' => valid = false,
                _ => {}
            }
        }
        return Some((&path[start..], start, valid));
    }
    None
}

/// Wildcard syntax checks that can run before any tree mutation.
fn validate_pattern(pattern: &str) -> Result<(), RouteError> {
    let mut rest = pattern;
    while let Some((wildcard, i, valid)) = find_wildcard(rest) {
        if !valid {
            return Err(RouteError::conflict(
                ConflictKind::MalformedWildcard,
                pattern,
                wildcard,
            ));
        }
        if wildcard.len() < 2 {
            return Err(RouteError::conflict(
                ConflictKind::EmptyWildcardName,
                pattern,
                wildcard,
            ));
        }
        if wildcard.as_bytes()[0] == b'*' {
            let at_end = i + wildcard.len() == rest.len();
            let after_slash = i > 0 && rest.as_bytes()[i - 1] == b'/';
            if !at_end || !after_slash {
                return Err(RouteError::conflict(
                    ConflictKind::MisplacedCatchAll,
                    pattern,
                    wildcard,
                ));
            }
        }
        rest = &rest[i + wildcard.len()..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictKind;

    fn tree_with(routes: &[&str]) -> Tree<String> {
        let mut tree = Tree::new();
        for r in routes {
            tree.add_route(r, vec![r.to_string()]).unwrap();
        }
        tree.check_invariants();
        tree
    }

    fn conflict_kind(tree: &mut Tree<String>, pattern: &str) -> ConflictKind {
        let err = tree
            .add_route(pattern, vec![pattern.to_string()])
            .unwrap_err();
        err.kind()
            .unwrap_or_else(|| panic!("expected conflict for {pattern:?}, got {err}"))
    }

    #[test]
    fn test_pattern_must_be_absolute() {
        let mut tree: Tree<u8> = Tree::new();
        assert!(matches!(
            tree.add_route("health", vec![1]),
            Err(RouteError::PatternNotAbsolute { .. })
        ));
    }

    #[test]
    fn test_handlers_must_be_non_empty() {
        let mut tree: Tree<u8> = Tree::new();
        assert!(matches!(
            tree.add_route("/health", vec![]),
            Err(RouteError::EmptyHandlerChain { .. })
        ));
    }

    #[test]
    fn test_duplicate_route() {
        let mut tree = tree_with(&["/health"]);
        assert_eq!(conflict_kind(&mut tree, "/health"), ConflictKind::Duplicate);
    }

    #[test]
    fn test_ambiguous_wildcard() {
        let mut tree = tree_with(&["/user/:name"]);
        assert_eq!(
            conflict_kind(&mut tree, "/user/:id"),
            ConflictKind::AmbiguousWildcard
        );
        // a longer name extending a shorter one is a conflict, not a sibling
        assert_eq!(
            conflict_kind(&mut tree, "/user/:names"),
            ConflictKind::AmbiguousWildcard
        );
    }

    #[test]
    fn test_wildcard_static_conflicts() {
        // static after wildcard
        let mut tree = tree_with(&["/user/:name"]);
        assert_eq!(
            conflict_kind(&mut tree, "/user/profile"),
            ConflictKind::WildcardStatic
        );

        // wildcard after static
        let mut tree = tree_with(&["/user/profile"]);
        assert_eq!(
            conflict_kind(&mut tree, "/user/:name"),
            ConflictKind::WildcardStatic
        );
    }

    #[test]
    fn test_catch_all_conflicts() {
        let mut tree = tree_with(&["/files/*path"]);
        assert_eq!(
            conflict_kind(&mut tree, "/files/static"),
            ConflictKind::WildcardStatic
        );

        // a catch-all cannot shadow an existing segment root
        let mut tree = tree_with(&["/files/"]);
        assert_eq!(
            conflict_kind(&mut tree, "/files/*path"),
            ConflictKind::WildcardStatic
        );
    }

    #[test]
    fn test_malformed_wildcards() {
        let mut tree: Tree<u8> = Tree::new();
        let kind = |t: &mut Tree<u8>, p: &str| t.add_route(p, vec![0]).unwrap_err().kind().unwrap();

        assert_eq!(
            kind(&mut tree, "/a/:b:c"),
            ConflictKind::MalformedWildcard
        );
        assert_eq!(
            kind(&mut tree, "/a/:b*c"),
            ConflictKind::MalformedWildcard
        );
        assert_eq!(kind(&mut tree, "/a/:/b"), ConflictKind::EmptyWildcardName);
        assert_eq!(kind(&mut tree, "/files/*"), ConflictKind::EmptyWildcardName);
        assert_eq!(
            kind(&mut tree, "/files/*path/x"),
            ConflictKind::MisplacedCatchAll
        );
        assert_eq!(
            kind(&mut tree, "/files*path"),
            ConflictKind::MisplacedCatchAll
        );

        // rejected patterns must leave no trace
        assert!(tree.registered_patterns().is_empty());
        tree.check_invariants();
    }

    #[test]
    fn test_split_preserves_routes() {
        let tree = tree_with(&["/contact", "/contract", "/con"]);
        let mut patterns = tree.registered_patterns();
        patterns.sort_unstable();
        assert_eq!(patterns, ["/con", "/contact", "/contract"]);
    }

    #[test]
    fn test_priority_reordering() {
        let mut tree = tree_with(&["/a", "/b1", "/b2"]);
        // pile registrations onto the /b branch so it outranks /a
        tree.add_route("/b3", vec!["/b3".into()]).unwrap();
        tree.add_route("/b4", vec!["/b4".into()]).unwrap();
        tree.check_invariants();

        let root = tree.node(NodeId::ROOT);
        assert_eq!(root.indices[0], b'b');
    }

    #[test]
    fn test_mid_segment_param() {
        let tree = tree_with(&["/user_:name"]);
        let hit = tree.get_value("/user_gordon", false);
        assert!(hit.handlers.is_some());
        assert_eq!(hit.params.get("name"), Some("gordon"));
    }

    #[test]
    fn test_large_corpus_invariants() {
        let routes = [
            "/",
            "/cmd/:tool/:sub",
            "/cmd/:tool/",
            "/src/*filepath",
            "/search/",
            "/search/:query",
            "/user_:name",
            "/user_:name/about",
            "/files/:dir/*filepath",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/info/:user/public",
            "/info/:user/project/:project",
        ];
        let tree = tree_with(&routes);
        assert_eq!(tree.registered_patterns().len(), routes.len());
        assert_eq!(tree.max_params(), 2);

        for r in &routes {
            // every literal (wildcard-free) pattern must round-trip
            if !r.contains(':') && !r.contains('*') {
                let hit = tree.get_value(r, false);
                assert!(hit.handlers.is_some(), "no match for {r:?}");
                assert_eq!(hit.full_path, *r);
            }
        }

        // registration order must not change the accepted route set
        let mut reversed: Vec<&str> = routes.to_vec();
        reversed.reverse();
        let other = tree_with(&reversed);
        let mut a = tree.registered_patterns();
        let mut b = other.registered_patterns();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_find_wildcard() {
        assert_eq!(find_wildcard("/a/b"), None);
        assert_eq!(find_wildcard("/:x/b"), Some((":x", 1, true)));
        assert_eq!(find_wildcard("/*rest"), Some(("*rest", 1, true)));
        assert_eq!(find_wildcard("/:x:y/b"), Some((":x:y", 1, false)));
    }
}
