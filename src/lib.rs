//! flow-path
//!
//! Cumulative transforms along chains of nested transform nodes. A node knows
//! its own translation, rotation, scale, scale orientation and center; a
//! `NodePath` strings nodes together from some root down to one node and folds
//! their local matrices into a single matrix (or its inverse). Paths also walk
//! the graph below them, yielding new paths for children and descendants.
//!
//! All matrices use the column-vector convention: `v' = M * v`, translation in
//! the fourth column, path composition `M_root * ... * M_leaf`.
//!
//! High-level modules
//! - `data_structures`: transform nodes and node paths
//! - `error`: failures of inversion and path indexing
//!

pub mod data_structures;
pub mod error;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use data_structures::{
    node_path::{Children, Descendants, NodePath},
    transform_node::{AxisAngle, MatrixOptions, NodeRef, TransformNode, TransformRaw},
};
pub use error::{Result, TransformError};
