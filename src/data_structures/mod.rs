//! Scene data structures for transform chains.
//!
//! - `transform_node` holds the per-node attributes and builds local matrices
//! - `node_path` composes nodes along a path and navigates below it

pub mod node_path;
pub mod transform_node;
