//! Node paths: an ordered chain of nodes from some root down to one node.
//!
//! A path holds references, not snapshots. Changing a node's attributes is
//! visible through every path that goes through it, without rebuilding the
//! path. Extending a path never touches the original: the new path shares the
//! old one as its prefix and only adds the appended nodes.

use std::{fmt, ops::Add, rc::Rc};

use cgmath::{Matrix4, Point3, Quaternion, SquareMatrix, Transform as _, Vector3};
use log::trace;

use crate::{
    data_structures::transform_node::{MatrixOptions, NodeRef, TransformRaw},
    error::{Result, TransformError},
};

/// One link of a path: the node plus everything above it.
struct Segment {
    prefix: Option<Rc<Segment>>,
    node: NodeRef,
    len: usize,
}

#[derive(Clone, Default)]
pub struct NodePath {
    tail: Option<Rc<Segment>>,
}

impl NodePath {
    /// The empty path, which stands for the identity transform.
    pub fn new() -> Self {
        Self { tail: None }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeRef>) -> Self {
        Self::new().extended(nodes)
    }

    /// A new path made of this one followed by `nodes`, in the given order.
    ///
    /// Nothing checks that the nodes really are children of the current tail.
    pub fn extended(&self, nodes: impl IntoIterator<Item = NodeRef>) -> NodePath {
        let mut tail = self.tail.clone();
        for node in nodes {
            let len = tail.as_ref().map_or(0, |segment| segment.len) + 1;
            tail = Some(Rc::new(Segment {
                prefix: tail,
                node,
                len,
            }));
        }
        NodePath { tail }
    }

    pub fn len(&self) -> usize {
        self.tail.as_ref().map_or(0, |segment| segment.len)
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    /// Walks the segments from the tail up to the root.
    fn segments(&self) -> impl Iterator<Item = &Segment> {
        std::iter::successors(self.tail.as_deref(), |segment| segment.prefix.as_deref())
    }

    /// The node references in root-to-leaf order.
    pub fn nodes(&self) -> Vec<NodeRef> {
        let mut nodes: Vec<NodeRef> = self.segments().map(|segment| segment.node.clone()).collect();
        nodes.reverse();
        nodes
    }

    pub fn iter(&self) -> std::vec::IntoIter<NodeRef> {
        self.nodes().into_iter()
    }

    pub fn get(&self, index: usize) -> Option<NodeRef> {
        let len = self.len();
        if index >= len {
            return None;
        }
        self.segments()
            .nth(len - 1 - index)
            .map(|segment| segment.node.clone())
    }

    /// Like `get`, but reports an out-of-range index as an error.
    pub fn node(&self, index: usize) -> Result<NodeRef> {
        self.get(index).ok_or(TransformError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.tail.as_ref().map(|segment| segment.node.clone())
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.get(0)
    }

    /// The path without its last node. `None` for the empty path.
    pub fn parent(&self) -> Option<NodePath> {
        self.tail.as_ref().map(|segment| NodePath {
            tail: segment.prefix.clone(),
        })
    }

    /// True if `prefix` is literally the start of this path, shared in memory
    /// rather than merely made of the same nodes.
    pub fn shares_prefix(&self, prefix: &NodePath) -> bool {
        let Some(expected) = prefix.tail.as_ref() else {
            return true;
        };
        self.segments()
            .find(|segment| segment.len == expected.len)
            .is_some_and(|segment| std::ptr::eq(segment, expected.as_ref()))
    }

    /// Position of the first node, counted from the root, carrying `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.nodes()
            .iter()
            .position(|node| node.borrow().name.as_deref() == Some(name))
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.segments().any(|segment| Rc::ptr_eq(&segment.node, node))
    }

    /**
     * Folds the local matrices of all nodes into one.
     *
     * Forward: `M_0 * M_1 * ... * M_n` with `M_0` the root, so a point ends up
     * where applying each node from the leaf upwards would put it.
     * Inverse: `M_n^-1 * ... * M_0^-1`, built from per-node inverses.
     * The translate/rotate/scale switches apply to every node of the chain.
     */
    pub fn transform_matrix(&self, options: &MatrixOptions) -> Result<Matrix4<f32>> {
        trace!(
            "Composing {} node(s) along {} with {:?}",
            self.len(),
            self,
            options
        );
        if options.inverse {
            self.segments().try_fold(Matrix4::identity(), |acc, segment| {
                Ok(acc * segment.node.borrow().inverse_matrix(options)?)
            })
        } else {
            Ok(self.forward_matrix(options))
        }
    }

    /// Leaf-to-root walk, so each node's matrix is prepended.
    fn forward_matrix(&self, options: &MatrixOptions) -> Matrix4<f32> {
        self.segments().fold(Matrix4::identity(), |acc, segment| {
            segment.node.borrow().forward_matrix(options) * acc
        })
    }

    /// Full forward transform from the tail's frame into the root's frame.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.forward_matrix(&MatrixOptions::default())
    }

    pub fn inverse_matrix(&self) -> Result<Matrix4<f32>> {
        self.transform_matrix(&MatrixOptions::default().inverted())
    }

    /// Accumulated rotation of all nodes, ignoring scale orientation.
    pub fn orientation(&self) -> Quaternion<f32> {
        self.segments()
            .fold(Quaternion::new(1.0, 0.0, 0.0, 0.0), |acc, segment| {
                segment.node.borrow().rotation.quaternion() * acc
            })
    }

    pub fn transform_point(&self, point: Point3<f32>) -> Point3<f32> {
        self.world_matrix().transform_point(point)
    }

    /// Transforms a direction: translations along the path have no effect.
    pub fn transform_vector(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.world_matrix().transform_vector(vector)
    }

    pub fn to_raw(&self) -> TransformRaw {
        TransformRaw::from_matrix(self.world_matrix())
    }

    /// One path per immediate child of the tail, each one node longer.
    ///
    /// The child list is read when this is called; the empty path has no tail
    /// and so no children.
    pub fn iter_children(&self) -> Children {
        let pending = self
            .last()
            .map(|node| node.borrow().children.clone())
            .unwrap_or_default();
        Children {
            base: self.clone(),
            pending: pending.into_iter(),
        }
    }

    /**
     * Every path below this one, depth-first and pre-order: a child comes
     * right before its own descendants, siblings in child-list order.
     *
     * A node reachable through several parents shows up once per path that
     * reaches it. Cyclic graphs never terminate.
     */
    pub fn iter_descendants(&self) -> Descendants {
        Descendants {
            stack: vec![self.iter_children()],
        }
    }
}

impl PartialEq for NodePath {
    /// Equal when both paths go through the very same nodes in the same order.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match (&self.tail, &other.tail) {
            (Some(a), Some(b)) if Rc::ptr_eq(a, b) => true,
            _ => self
                .segments()
                .zip(other.segments())
                .all(|(a, b)| Rc::ptr_eq(&a.node, &b.node)),
        }
    }
}

impl Eq for NodePath {}

impl Drop for NodePath {
    /// Unlinks segments iteratively, up to the first one still shared.
    fn drop(&mut self) {
        let mut next = self.tail.take();
        while let Some(segment) = next {
            match Rc::try_unwrap(segment) {
                Ok(mut segment) => next = segment.prefix.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "/");
        }
        for node in self.nodes() {
            write!(f, "/{}", node.borrow().label())?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({})", self)
    }
}

impl Add<Vec<NodeRef>> for &NodePath {
    type Output = NodePath;

    fn add(self, rhs: Vec<NodeRef>) -> Self::Output {
        self.extended(rhs)
    }
}

impl Add<Vec<NodeRef>> for NodePath {
    type Output = NodePath;

    fn add(self, rhs: Vec<NodeRef>) -> Self::Output {
        self.extended(rhs)
    }
}

impl<'a, 'b> Add<&'b [NodeRef]> for &'a NodePath {
    type Output = NodePath;

    fn add(self, rhs: &'b [NodeRef]) -> Self::Output {
        self.extended(rhs.iter().cloned())
    }
}

/// Lazily yields the receiver extended by each child of its tail.
pub struct Children {
    base: NodePath,
    pending: std::vec::IntoIter<NodeRef>,
}

impl Iterator for Children {
    type Item = NodePath;

    fn next(&mut self) -> Option<NodePath> {
        self.pending.next().map(|child| self.base.extended([child]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl ExactSizeIterator for Children {}

/// Depth-first walk below a path. Each level is only expanded when reached.
pub struct Descendants {
    stack: Vec<Children>,
}

impl Iterator for Descendants {
    type Item = NodePath;

    fn next(&mut self) -> Option<NodePath> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(path) => {
                    self.stack.push(path.iter_children());
                    return Some(path);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
