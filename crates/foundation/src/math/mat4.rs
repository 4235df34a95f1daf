use super::Vec3;

/// Column-major 4x4 matrix, laid out the way WGSL expects it.
pub type Mat4 = [[f32; 4]; 4];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

/// Right-handed perspective projection with a [0, 1] depth range.
pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// Model matrix for a translation followed by an XYZ-ordered Euler rotation
/// (rotation applied as `Rx * Ry * Rz`).
pub fn mat4_from_translation_euler_xyz(translation: Vec3, rotation: Vec3) -> Mat4 {
    let (b, a) = rotation.x.sin_cos();
    let (d, c) = rotation.y.sin_cos();
    let (f, e) = rotation.z.sin_cos();

    let ae = a * e;
    let af = a * f;
    let be = b * e;
    let bf = b * f;

    [
        [(c * e) as f32, (af + be * d) as f32, (bf - ae * d) as f32, 0.0],
        [(-c * f) as f32, (ae - bf * d) as f32, (be + af * d) as f32, 0.0],
        [d as f32, (-b * c) as f32, (a * c) as f32, 0.0],
        [
            translation.x as f32,
            translation.y as f32,
            translation.z as f32,
            1.0,
        ],
    ]
}

pub fn mat4_transform_point(m: Mat4, p: [f32; 3]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn identity_is_neutral_for_mul() {
        let m = mat4_from_translation_euler_xyz(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.2, 0.1));
        assert_eq!(mat4_mul(MAT4_IDENTITY, m), m);
        assert_eq!(mat4_mul(m, MAT4_IDENTITY), m);
    }

    #[test]
    fn translation_moves_origin() {
        let m = mat4_from_translation_euler_xyz(Vec3::new(1.0, -2.0, 0.5), Vec3::ZERO);
        assert!(approx(
            mat4_transform_point(m, [0.0, 0.0, 0.0]),
            [1.0, -2.0, 0.5, 1.0]
        ));
    }

    #[test]
    fn rotation_about_z_turns_x_into_y() {
        let m = mat4_from_translation_euler_xyz(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        assert!(approx(
            mat4_transform_point(m, [1.0, 0.0, 0.0]),
            [0.0, 1.0, 0.0, 1.0]
        ));
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = mat4_look_at_rh(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(approx(
            mat4_transform_point(view, [0.0, 0.0, 0.0]),
            [0.0, 0.0, -5.0, 1.0]
        ));
    }
}
