//! Transform nodes and their local matrices.
//!
//! A node carries the spatial attributes of one level of nesting
//! (translation, rotation, scale, scale orientation and center) and builds the
//! matching 4x4 matrix. Matrices follow cgmath's column-vector convention:
//! a point is transformed as `v' = M * v` and the translation lives in the
//! fourth column.

use std::{cell::RefCell, rc::Rc};

use cgmath::{InnerSpace, Matrix, Matrix4, One, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};
use log::debug;

use crate::error::{Result, TransformError};

/// Shared handle to a node.
///
/// Nodes never point back to their parent: the same node may sit at several
/// places of a graph, and where it sits is described by a `NodePath` only.
pub type NodeRef = Rc<RefCell<TransformNode>>;

/// A rotation given as an axis and an angle in radians.
///
/// The axis does not need to be normalized. A zero-length axis is treated as
/// no rotation at all, whatever the angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAngle {
    pub axis: Vector3<f32>,
    pub angle: f32,
}

impl AxisAngle {
    pub fn new(axis: impl Into<Vector3<f32>>, angle: f32) -> Self {
        Self {
            axis: axis.into(),
            angle,
        }
    }

    /// Rotation by zero radians around `+Z`.
    pub fn identity() -> Self {
        Self::new([0.0, 0.0, 1.0], 0.0)
    }

    fn unit_axis(&self) -> Option<Vector3<f32>> {
        let length = self.axis.magnitude();
        if length == 0.0 || !length.is_finite() {
            debug!(
                "Rotation axis {:?} has no direction, falling back to identity.",
                self.axis
            );
            return None;
        }
        Some(self.axis / length)
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match self.unit_axis() {
            Some(axis) => Matrix4::from_axis_angle(axis, Rad(self.angle)),
            None => Matrix4::identity(),
        }
    }

    /// The inverse of a pure rotation is its transpose.
    pub fn inverse_matrix(&self) -> Matrix4<f32> {
        self.matrix().transpose()
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        match self.unit_axis() {
            Some(axis) => Quaternion::from_axis_angle(axis, Rad(self.angle)),
            None => Quaternion::one(),
        }
    }
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::identity()
    }
}

/// `[x, y, z, angle]`, the usual four-float rotation notation.
impl From<[f32; 4]> for AxisAngle {
    fn from([x, y, z, angle]: [f32; 4]) -> Self {
        Self::new([x, y, z], angle)
    }
}

/// Which factors take part in a matrix, and in which direction.
///
/// The default is the full forward transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixOptions {
    pub inverse: bool,
    pub translate: bool,
    pub rotate: bool,
    pub scale: bool,
}

impl MatrixOptions {
    pub fn new() -> Self {
        Self {
            inverse: false,
            translate: true,
            rotate: true,
            scale: true,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// Drops the node translations; centers still bracket rotation and scale.
    pub fn without_translation(mut self) -> Self {
        self.translate = false;
        self
    }

    pub fn without_rotation(mut self) -> Self {
        self.rotate = false;
        self
    }

    /// Drops the scale together with the scale orientation that aligns it.
    pub fn without_scale(mut self) -> Self {
        self.scale = false;
        self
    }
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial attributes of a single node plus its ordered children.
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub translation: Vector3<f32>,
    pub rotation: AxisAngle,
    pub scale: Vector3<f32>,
    pub scale_orientation: AxisAngle,
    pub center: Vector3<f32>,
    pub children: Vec<NodeRef>,
    /// Only used for diagnostics, never for geometry.
    pub name: Option<String>,
}

impl TransformNode {
    /// Create a node with identity transformation and no children.
    pub fn new() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: AxisAngle::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            scale_orientation: AxisAngle::identity(),
            center: Vector3::new(0.0, 0.0, 0.0),
            children: Vec::new(),
            name: None,
        }
    }

    pub fn with_translation(mut self, translation: impl Into<Vector3<f32>>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_rotation(mut self, rotation: impl Into<AxisAngle>) -> Self {
        self.rotation = rotation.into();
        self
    }

    pub fn with_scale(mut self, scale: impl Into<Vector3<f32>>) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn with_scale_orientation(mut self, orientation: impl Into<AxisAngle>) -> Self {
        self.scale_orientation = orientation.into();
        self
    }

    pub fn with_center(mut self, center: impl Into<Vector3<f32>>) -> Self {
        self.center = center.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn add_child(&mut self, child: NodeRef) {
        self.children.push(child);
    }

    /// Wraps the node into a shareable handle.
    pub fn into_ref(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// `T * C * R * SR * S * SR^-1 * C^-1`, minus whatever `options` switches off.
    ///
    /// `options.inverse` is ignored here; this never fails, even for a zero scale.
    pub fn forward_matrix(&self, options: &MatrixOptions) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        if options.translate {
            matrix = matrix * Matrix4::from_translation(self.translation);
        }
        matrix = matrix * Matrix4::from_translation(self.center);
        if options.rotate {
            matrix = matrix * self.rotation.matrix();
        }
        if options.scale {
            matrix = matrix
                * self.scale_orientation.matrix()
                * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
                * self.scale_orientation.inverse_matrix();
        }
        matrix * Matrix4::from_translation(-self.center)
    }

    /// Undoes `forward_matrix` by inverting every factor in reverse order.
    pub fn inverse_matrix(&self, options: &MatrixOptions) -> Result<Matrix4<f32>> {
        let mut matrix = Matrix4::from_translation(self.center);
        if options.scale {
            let scale: [f32; 3] = self.scale.into();
            if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                debug!(
                    "Refusing to invert node {} with scale {:?}.",
                    self.label(),
                    self.scale
                );
                return Err(TransformError::DegenerateTransform {
                    name: self.label().to_string(),
                    scale,
                });
            }
            matrix = matrix
                * self.scale_orientation.matrix()
                * Matrix4::from_nonuniform_scale(
                    1.0 / self.scale.x,
                    1.0 / self.scale.y,
                    1.0 / self.scale.z,
                )
                * self.scale_orientation.inverse_matrix();
        }
        if options.rotate {
            matrix = matrix * self.rotation.inverse_matrix();
        }
        matrix = matrix * Matrix4::from_translation(-self.center);
        if options.translate {
            matrix = matrix * Matrix4::from_translation(-self.translation);
        }
        Ok(matrix)
    }

    /// The local matrix, or its inverse when `options.inverse` is set.
    pub fn local_matrix(&self, options: &MatrixOptions) -> Result<Matrix4<f32>> {
        if options.inverse {
            self.inverse_matrix(options)
        } else {
            Ok(self.forward_matrix(options))
        }
    }
}

impl From<Vector3<f32>> for TransformNode {
    fn from(translation: Vector3<f32>) -> Self {
        TransformNode {
            translation,
            ..Default::default()
        }
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * A matrix laid out the way a GPU buffer expects it.
 *
 * `handedness` is the sign of the determinant, so shaders can flip winding
 * and tangent frames for mirrored transforms.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
    pub handedness: f32,
}

impl TransformRaw {
    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        Self {
            model: matrix.into(),
            handedness: matrix.determinant().signum(),
        }
    }
}
