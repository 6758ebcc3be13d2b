//! Compressed radix tree keyed by URL path.
//!
//! # Data Flow
//! ```text
//! register("/user/:name")      lookup("/user/alice")
//!          │                            │
//!          ▼                            ▼
//!     insert::add_route           lookup::get_value
//!          │                            │
//!          └────────► node::Tree ◄──────┘
//!                          │
//!                          ▼
//!              recover::find_case_insensitive_path
//! ```
//!
//! # Design Decisions
//! - Nodes live in a single arena (`Vec<Node>`) and refer to each other
//!   by index, so the tree is `Send + Sync` without interior mutability
//! - Edge labels are compressed: a node stores the longest byte prefix
//!   shared by everything below it
//! - Static children are ordered by registration count (priority), so
//!   hot routes are probed first
//! - Wildcard children (`:param`, `*rest`) are stored apart from static
//!   children and are mutually exclusive with them at a given node

mod insert;
mod lookup;
mod node;
mod recover;

pub use lookup::Lookup;
pub use node::{Param, Params, Tree};
