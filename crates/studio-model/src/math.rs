//! Angle and transform helpers shared by the model and the animation core.
//!
//! Euler angles are stored as `Vec3(pitch, yaw, roll)` in degrees. The world is
//! Z-up with +X forward, so yaw turns about Z, pitch about Y and roll about X.

use glam::{Affine3A, EulerRot, Quat, Vec3};

/// Convert pitch/yaw/roll degrees to a rotation
pub fn angles_to_quat(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// Convert a rotation back to pitch/yaw/roll degrees
pub fn quat_to_angles(q: Quat) -> Vec3 {
    let (yaw, pitch, roll) = q.to_euler(EulerRot::ZYX);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Build an entity-to-world transform from angles and origin
pub fn angle_transform(angles: Vec3, origin: Vec3) -> Affine3A {
    Affine3A::from_rotation_translation(angles_to_quat(angles), origin)
}

/// Extract pitch/yaw/roll degrees from a (possibly scaled) transform
pub fn transform_angles(transform: &Affine3A) -> Vec3 {
    let (_, rotation, _) = transform.to_scale_rotation_translation();
    quat_to_angles(rotation)
}

/// Rotate a vector about the world up axis
pub fn yaw_rotate(v: Vec3, yaw_degrees: f32) -> Vec3 {
    Quat::from_rotation_z(yaw_degrees.to_radians()) * v
}

/// Wrap an angle in degrees into `(-180, 180]`
pub fn angle_normalize(degrees: f32) -> f32 {
    let a = degrees.rem_euclid(360.0);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Forward, right and up vectors of a transform's basis
pub fn axis_vectors(transform: &Affine3A) -> (Vec3, Vec3, Vec3) {
    let forward = Vec3::from(transform.matrix3.x_axis);
    let left = Vec3::from(transform.matrix3.y_axis);
    let up = Vec3::from(transform.matrix3.z_axis);
    (forward, -left, up)
}
