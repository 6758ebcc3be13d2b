//! Route lookup.
//!
//! # Responsibilities
//! - Walk the tree for a concrete request path
//! - Extract parameter values, optionally percent-decoded
//! - Recommend a trailing-slash redirect when only that separates the path
//!   from a registered route
//!
//! # Design Decisions
//! - "No match" is a value, never an error
//! - The parameter buffer is pre-sized from the tree's parameter bound so
//!   the walk performs no reallocation
//! - Percent-decoding failures degrade to the raw value; a lookup cannot fail

use percent_encoding::percent_decode_str;

use super::node::{NodeId, NodeKind, Params, Tree};

/// The outcome of a tree lookup.
///
/// `handlers` is `None` when no route matched; `tsr` then reports whether
/// adding or removing a single trailing slash would produce a match.
#[derive(Debug)]
pub struct Lookup<'tree, T> {
    /// The matched route's handler chain, if any.
    pub handlers: Option<&'tree [T]>,
    /// Extracted path parameters, in pattern order.
    pub params: Params,
    /// Trailing-slash redirect recommendation, set only on a failed lookup.
    pub tsr: bool,
    /// The matched route's registered pattern, for diagnostics.
    pub full_path: &'tree str,
}

impl<'tree, T> Lookup<'tree, T> {
    pub(crate) fn not_found(tsr: bool) -> Self {
        Lookup {
            handlers: None,
            params: Params::default(),
            tsr,
            full_path: "",
        }
    }

    pub fn is_match(&self) -> bool {
        self.handlers.is_some()
    }
}

impl<T> Tree<T> {
    /// Looks up the handler chain registered for `path`.
    ///
    /// The path is matched as given; lexical normalization is a caller-side
    /// policy decision. When `unescape` is set, parameter values are
    /// percent-decoded.
    pub fn get_value(&self, path: &str, unescape: bool) -> Lookup<'_, T> {
        let mut params = Params::with_capacity(self.max_params());
        let mut cur = NodeId::ROOT;
        let mut path = path;

        loop {
            let node = self.node(cur);
            let prefix = node.label.as_str();

            if path.len() > prefix.len() {
                if !path.as_bytes().starts_with(prefix.as_bytes()) {
                    break;
                }
                path = &path[prefix.len()..];

                if node.wildcard.is_none() {
                    let c = path.as_bytes()[0];
                    if let Some(pos) = node.indices.iter().position(|&b| b == c) {
                        cur = node.children[pos];
                        continue;
                    }
                    // Nothing below matches; recommend dropping an extra
                    // trailing slash if this node itself is a route.
                    let tsr = path == "/" && node.handlers.is_some();
                    return Lookup::not_found(tsr);
                }

                let wid = match node.wildcard {
                    Some(w) => w,
                    None => break,
                };
                let wnode = self.node(wid);
                match wnode.kind {
                    NodeKind::Param => {
                        // consume one path segment
                        let end = path
                            .bytes()
                            .position(|b| b == b'/')
                            .unwrap_or(path.len());
                        params.push(&wnode.label[1..], decode_value(&path[..end], unescape));

                        if end < path.len() {
                            if let Some(&child) = wnode.children.first() {
                                path = &path[end..];
                                cur = child;
                                continue;
                            }
                            // the route ends at the parameter; a lone
                            // trailing slash is redirectable
                            let tsr = path.len() == end + 1 && wnode.handlers.is_some();
                            return Lookup::not_found(tsr);
                        }

                        if let Some(h) = &wnode.handlers {
                            return Lookup {
                                handlers: Some(h),
                                params,
                                tsr: false,
                                full_path: &wnode.full_path,
                            };
                        }
                        if let Some(&child) = wnode.children.first() {
                            let c = self.node(child);
                            let tsr = c.label == "/" && c.handlers.is_some();
                            return Lookup::not_found(tsr);
                        }
                        return Lookup::not_found(false);
                    }
                    NodeKind::CatchAll => {
                        // the remainder of the path, leading slash included
                        params.push(&wnode.label[2..], decode_value(path, unescape));
                        match &wnode.handlers {
                            Some(h) => {
                                return Lookup {
                                    handlers: Some(h),
                                    params,
                                    tsr: false,
                                    full_path: &wnode.full_path,
                                }
                            }
                            None => return Lookup::not_found(false),
                        }
                    }
                    // a wildcard child is always Param or CatchAll
                    NodeKind::Static | NodeKind::Root => return Lookup::not_found(false),
                }
            }

            if path == prefix {
                if let Some(h) = &node.handlers {
                    return Lookup {
                        handlers: Some(h),
                        params,
                        tsr: false,
                        full_path: &node.full_path,
                    };
                }

                // No handler chain here; would a trailing slash help?
                if let Some(w) = node.wildcard {
                    let wnode = self.node(w);
                    // a catch-all child matches the slash-appended path
                    if wnode.kind == NodeKind::CatchAll && wnode.handlers.is_some() {
                        return Lookup::not_found(true);
                    }
                    if path == "/" && node.kind != NodeKind::Root {
                        return Lookup::not_found(true);
                    }
                    return Lookup::not_found(false);
                }
                if let Some(pos) = node.indices.iter().position(|&b| b == b'/') {
                    let child = self.node(node.children[pos]);
                    let tsr = (child.label == "/" && child.handlers.is_some())
                        || child.wildcard.is_some_and(|w| {
                            let w = self.node(w);
                            w.kind == NodeKind::CatchAll && w.handlers.is_some()
                        });
                    return Lookup::not_found(tsr);
                }
                return Lookup::not_found(false);
            }

            break;
        }

        // Nothing matched; recommend removing or adding a trailing slash if
        // that alone reaches a registered route.
        let node = self.node(cur);
        let prefix = node.label.as_str();
        let tsr = path == "/"
            || (prefix.len() == path.len() + 1
                && prefix.as_bytes()[path.len()] == b'/'
                && prefix.as_bytes().starts_with(path.as_bytes())
                && node.handlers.is_some());
        Lookup::not_found(tsr)
    }
}

fn decode_value(raw: &str, unescape: bool) -> String {
    if !unescape {
        return raw.to_string();
    }
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
