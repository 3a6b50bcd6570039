use std::f32::consts::FRAC_PI_4;

use flow_path::{MatrixOptions, NodePath, Point3, TransformNode, Vector3};
use log::info;

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let moon = TransformNode::new()
        .with_translation([0.5, 0.0, 0.0])
        .with_scale([0.25, 0.25, 0.25])
        .with_name("moon")
        .into_ref();
    let planet = TransformNode::new()
        .with_translation([4.0, 0.0, 0.0])
        .with_rotation([0.0, 1.0, 0.0, FRAC_PI_4])
        .with_name("planet")
        .with_children([moon.clone()])
        .into_ref();
    let sun = TransformNode::new()
        .with_scale([2.0, 2.0, 2.0])
        .with_name("sun")
        .with_children([planet.clone()])
        .into_ref();

    let system = NodePath::from_nodes([sun.clone()]);
    for step in 0..4 {
        planet.borrow_mut().rotation.angle = FRAC_PI_4 * (step + 1) as f32;
        for path in system.iter_descendants() {
            let position = path.transform_point(Point3::new(0.0, 0.0, 0.0));
            let up = path.transform_matrix(&MatrixOptions::default().without_translation())?
                * Vector3::new(0.0, 1.0, 0.0).extend(0.0);
            let back = Point3::from_homogeneous(path.inverse_matrix()? * position.to_homogeneous());
            info!(
                "step {} {}: at {:?}, up {:?}, back to local {:?}",
                step, path, position, up.truncate(), back
            );
        }
    }
    Ok(())
}
