//! Minimal column-major 4x4 matrix helpers for the quad pipelines.
//!
//! Column-major to match WGSL uniform layout; `mul(a, b)` applies `b` first.

pub type Mat4 = [f32; 16];

#[must_use]
pub fn identity() -> Mat4 {
    let mut m = [0.0; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

#[must_use]
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[k * 4 + row] * b[col * 4 + k];
            }
            out[col * 4 + row] = sum;
        }
    }
    out
}

#[must_use]
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = identity();
    m[12] = x;
    m[13] = y;
    m[14] = z;
    m
}

#[must_use]
pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = identity();
    m[0] = x;
    m[5] = y;
    m[10] = z;
    m
}

#[must_use]
pub fn rotate_x(degrees: f32) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    let mut m = identity();
    m[5] = c;
    m[6] = s;
    m[9] = -s;
    m[10] = c;
    m
}

#[must_use]
pub fn rotate_y(degrees: f32) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    let mut m = identity();
    m[0] = c;
    m[2] = -s;
    m[8] = s;
    m[10] = c;
    m
}

/// Right-handed perspective projection with 0..1 depth.
#[must_use]
pub fn perspective(fovy_rad: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fovy_rad / 2.0).tan();
    let mut m = [0.0; 16];
    m[0] = f / aspect;
    m[5] = f;
    m[10] = far / (near - far);
    m[11] = -1.0;
    m[14] = near * far / (near - far);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_rotate_composes_right_to_left() {
        // Rotate +90 degrees about Y after translating +Z: the translated
        // point (0,0,1) should land at (1,0,0).
        let m = mul(&rotate_y(90.0), &translate(0.0, 0.0, 1.0));
        let x = m[12];
        let z = m[14];
        assert!((x - 1.0).abs() < 1e-6);
        assert!(z.abs() < 1e-6);
    }

    #[test]
    fn identity_round_trip() {
        let m = mul(&identity(), &translate(3.0, -2.0, 1.0));
        assert_eq!(m, translate(3.0, -2.0, 1.0));
    }
}
