//! 3D vector utilities for court-space simulation.
//!
//! Court axes: +y is up, the net lies in the z = 0 plane, the blue half is
//! +z and the purple half is -z. Yaw is measured in degrees around +y with
//! yaw 0 facing +z.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        add(self, rhs)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = add(*self, rhs);
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        sub(self, rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        scale(self, s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Dot product
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Cross product
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3 {
        x: a.y * b.z - a.z * b.y,
        y: a.z * b.x - a.x * b.z,
        z: a.x * b.y - a.y * b.x,
    }
}

/// Vector length
pub fn length(v: Vec3) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Unit vector, or None when the input is too short to have a direction.
pub fn try_normalize(v: Vec3) -> Option<Vec3> {
    let len = length(v);
    if len < 1e-10 || !len.is_finite() {
        return None;
    }
    Some(Vec3::new(v.x / len, v.y / len, v.z / len))
}

/// Normalize vector to unit length; degenerate input yields zero.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    try_normalize(v).unwrap_or(Vec3::ZERO)
}

/// Scale vector by scalar
pub fn scale(v: Vec3, s: f64) -> Vec3 {
    Vec3::new(v.x * s, v.y * s, v.z * s)
}

/// Add two vectors
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

/// Subtract vectors (a - b)
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

/// Drop the vertical component.
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f64) -> Vec3 {
    let diff = sub(target, current);
    let dist = length(diff);
    if dist <= max_delta || dist < 1e-12 {
        target
    } else {
        add(current, scale(diff, max_delta / dist))
    }
}

/// Rotate vector around axis by angle (Rodrigues' rotation formula).
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let one_minus_cos = 1.0 - cos_a;

    let cross_av = cross(axis, v);
    let dot_av = dot(axis, v);

    Vec3 {
        x: v.x * cos_a + cross_av.x * sin_a + axis.x * dot_av * one_minus_cos,
        y: v.y * cos_a + cross_av.y * sin_a + axis.y * dot_av * one_minus_cos,
        z: v.z * cos_a + cross_av.z * sin_a + axis.z * dot_av * one_minus_cos,
    }
}

/// Spherical linear interpolation between two unit vectors.
/// t=0 returns a, t=1 returns b. Nearly opposite inputs turn around
/// `fallback_axis`.
pub fn slerp(a: Vec3, b: Vec3, t: f64, fallback_axis: Vec3) -> Vec3 {
    let d = dot(a, b).clamp(-1.0, 1.0);

    // If vectors are very close, use linear interpolation to avoid division by zero
    if d > 0.9995 {
        return normalize_or_zero(Vec3::new(
            a.x + t * (b.x - a.x),
            a.y + t * (b.y - a.y),
            a.z + t * (b.z - a.z),
        ));
    }

    if d < -0.9995 {
        return normalize_or_zero(rotate_around_axis(
            a,
            fallback_axis,
            std::f64::consts::PI * t,
        ));
    }

    let theta = d.acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;

    Vec3::new(
        wa * a.x + wb * b.x,
        wa * a.y + wb * b.y,
        wa * a.z + wb * b.z,
    )
}

/// Facing direction on the ground plane for a yaw in degrees.
pub fn forward_from_yaw(yaw_deg: f64) -> Vec3 {
    let r = yaw_deg.to_radians();
    Vec3::new(r.sin(), 0.0, r.cos())
}

/// Right-hand direction on the ground plane for a yaw in degrees.
pub fn right_from_yaw(yaw_deg: f64) -> Vec3 {
    let r = yaw_deg.to_radians();
    Vec3::new(r.cos(), 0.0, -r.sin())
}

/// Yaw in degrees of a horizontal look direction, or None if degenerate.
pub fn yaw_from_direction(dir: Vec3) -> Option<f64> {
    let flat = try_normalize(horizontal(dir))?;
    Some(flat.x.atan2(flat.z).to_degrees())
}
