use std::f32::consts::FRAC_PI_2;

use flow_path::{Matrix4, NodePath, NodeRef, Point3, TransformNode};

pub const EPSILON: f32 = 1e-4;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn matrices_close(a: &Matrix4<f32>, b: &Matrix4<f32>, epsilon: f32) -> bool {
    let a: [[f32; 4]; 4] = (*a).into();
    let b: [[f32; 4]; 4] = (*b).into();
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() <= epsilon)
}

pub fn assert_matrix_close(actual: &Matrix4<f32>, expected: &Matrix4<f32>, epsilon: f32) {
    assert!(
        matrices_close(actual, expected, epsilon),
        "matrices differ:\n actual: {:?}\n expected: {:?}",
        actual,
        expected
    );
}

pub fn assert_point_close(actual: Point3<f32>, expected: Point3<f32>, epsilon: f32) {
    let delta = [
        actual.x - expected.x,
        actual.y - expected.y,
        actual.z - expected.z,
    ];
    assert!(
        delta.iter().all(|d| d.abs() <= epsilon),
        "points differ: actual {:?}, expected {:?}",
        actual,
        expected
    );
}

/// Four nested nodes, the third one rotated and scaled.
pub(crate) struct Chain {
    pub empty: NodePath,
    pub first_child: NodePath,
    pub second_child: NodePath,
    pub third_child: NodePath,
    pub fourth_child: NodePath,
}

impl Chain {
    pub fn new() -> Self {
        let empty = NodePath::new();
        let first_child = &empty
            + vec![
                TransformNode::new()
                    .with_translation([1.0, 0.0, 0.0])
                    .with_name("first")
                    .into_ref(),
            ];
        let second_child = &first_child
            + vec![
                TransformNode::new()
                    .with_translation([1.0, 0.0, 0.0])
                    .with_name("second")
                    .into_ref(),
            ];
        let third_child = &second_child
            + vec![
                TransformNode::new()
                    .with_translation([3.0, 0.0, 0.0])
                    .with_scale([2.0, 1.0, 2.0])
                    .with_rotation([0.0, 1.0, 0.0, FRAC_PI_2])
                    .with_name("third")
                    .into_ref(),
            ];
        let fourth_child =
            &third_child + vec![TransformNode::new().with_name("fourth").into_ref()];
        Self {
            empty,
            first_child,
            second_child,
            third_child,
            fourth_child,
        }
    }
}

/// ```text
/// root
/// ├── a
/// │   ├── c
/// │   └── shared
/// └── b
///     └── shared
/// ```
pub(crate) struct Tree {
    pub root: NodeRef,
    pub a: NodeRef,
    pub b: NodeRef,
    pub c: NodeRef,
    pub shared: NodeRef,
}

impl Tree {
    pub fn new() -> Self {
        let c = TransformNode::new().with_name("c").into_ref();
        let shared = TransformNode::new()
            .with_translation([0.0, 1.0, 0.0])
            .with_name("shared")
            .into_ref();
        let a = TransformNode::new()
            .with_translation([1.0, 0.0, 0.0])
            .with_name("a")
            .with_children([c.clone(), shared.clone()])
            .into_ref();
        let b = TransformNode::new()
            .with_translation([-1.0, 0.0, 0.0])
            .with_name("b")
            .with_children([shared.clone()])
            .into_ref();
        let root = TransformNode::new()
            .with_name("root")
            .with_children([a.clone(), b.clone()])
            .into_ref();
        Self {
            root,
            a,
            b,
            c,
            shared,
        }
    }

    pub fn root_path(&self) -> NodePath {
        NodePath::from_nodes([self.root.clone()])
    }
}
