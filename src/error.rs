//! Error types for matrix construction and path access.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// An inverse was requested for a node whose scale has a zero or
    /// non-finite component.
    #[error("Cannot invert transform of node {name}: scale {scale:?} is zero or not finite")]
    DegenerateTransform { name: String, scale: [f32; 3] },
    #[error("Index {index} is out of range for a path of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, TransformError>;
