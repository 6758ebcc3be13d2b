//! Case-insensitive path recovery.
//!
//! # Responsibilities
//! - Suggest a corrected path after a failed lookup, folding ASCII case
//! - Reconstruct the tree's stored casing for static segments
//! - Optionally fix a missing or superfluous trailing slash
//!
//! # Design Decisions
//! - Case folding is not injective, so every sibling whose folded first
//!   byte matches is tried, backtracking on failure
//! - Parameter and catch-all values keep the request's casing untouched
//! - Works on bytes throughout; the suggestion is rebuilt from valid
//!   UTF-8 fragments of the stored labels and the request

use super::node::{NodeId, NodeKind, Tree};

impl<T> Tree<T> {
    /// Returns the registered path that `path` matches up to ASCII case,
    /// or `None` if no such route exists.
    ///
    /// When `fix_trailing_slash` is set, a missing or extra trailing slash
    /// is corrected as part of the suggestion.
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut out = Vec::with_capacity(path.len() + 1);
        if self.recover_walk(NodeId::ROOT, path.as_bytes(), fix_trailing_slash, &mut out) {
            String::from_utf8(out).ok()
        } else {
            None
        }
    }

    fn recover_walk(&self, cur: NodeId, path: &[u8], fix: bool, out: &mut Vec<u8>) -> bool {
        let node = self.node(cur);
        let prefix = node.label.as_bytes();

        if path.len() < prefix.len() || !path[..prefix.len()].eq_ignore_ascii_case(prefix) {
            // The label overshoots the path; the stored route may only
            // differ by its trailing slash.
            if fix
                && prefix.len() == path.len() + 1
                && prefix[path.len()] == b'/'
                && path.eq_ignore_ascii_case(&prefix[..path.len()])
                && node.handlers.is_some()
            {
                out.extend_from_slice(prefix);
                return true;
            }
            return false;
        }

        let rest = &path[prefix.len()..];
        out.extend_from_slice(prefix);

        if rest.is_empty() {
            if node.handlers.is_some() {
                return true;
            }
            // No route ends here; a trailing slash may reach one.
            if fix {
                if let Some(w) = node.wildcard {
                    let wnode = self.node(w);
                    if wnode.kind == NodeKind::CatchAll && wnode.handlers.is_some() {
                        out.push(b'/');
                        return true;
                    }
                }
                if let Some(pos) = node.indices.iter().position(|&b| b == b'/') {
                    let child = self.node(node.children[pos]);
                    let slash_route = (child.label == "/" && child.handlers.is_some())
                        || child.wildcard.is_some_and(|w| {
                            let w = self.node(w);
                            w.kind == NodeKind::CatchAll && w.handlers.is_some()
                        });
                    if slash_route {
                        out.push(b'/');
                        return true;
                    }
                }
            }
            return false;
        }

        if node.wildcard.is_none() {
            // Folding is not injective: try every candidate sibling.
            let c = rest[0].to_ascii_lowercase();
            let saved = out.len();
            for (pos, &b) in node.indices.iter().enumerate() {
                if b.to_ascii_lowercase() == c {
                    if self.recover_walk(node.children[pos], rest, fix, out) {
                        return true;
                    }
                    out.truncate(saved);
                }
            }
            // Nothing matched below; drop a superfluous trailing slash.
            return fix && rest == b"/" && node.handlers.is_some();
        }

        let wid = match node.wildcard {
            Some(w) => w,
            None => return false,
        };
        let wnode = self.node(wid);
        match wnode.kind {
            NodeKind::Param => {
                let end = rest
                    .iter()
                    .position(|&b| b == b'/')
                    .unwrap_or(rest.len());
                // parameter values keep the request casing
                out.extend_from_slice(&rest[..end]);

                if end < rest.len() {
                    if let Some(&child) = wnode.children.first() {
                        let saved = out.len();
                        if self.recover_walk(child, &rest[end..], fix, out) {
                            return true;
                        }
                        out.truncate(saved);
                    }
                    // the walk ran out of tree one slash early
                    return fix && rest.len() == end + 1 && wnode.handlers.is_some();
                }

                if wnode.handlers.is_some() {
                    return true;
                }
                if fix {
                    if let Some(&child) = wnode.children.first() {
                        let c = self.node(child);
                        if c.label == "/" && c.handlers.is_some() {
                            out.push(b'/');
                            return true;
                        }
                    }
                }
                false
            }
            NodeKind::CatchAll => {
                out.extend_from_slice(rest);
                wnode.handlers.is_some()
            }
            // a wildcard child is always Param or CatchAll
            NodeKind::Static | NodeKind::Root => false,
        }
    }
}
