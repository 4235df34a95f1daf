use super::Vec3;

/// Polar/azimuthal angles of one point in an even sphere distribution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereAngles {
    /// Polar angle from +z, in `[0, π]`.
    pub phi: f64,
    /// Azimuth, unbounded (spirals around the sphere).
    pub theta: f64,
}

/// Latitude-spiral distribution of `count` points over a sphere.
///
/// `phi = acos(-1 + 2i/n)`, `theta = sqrt(n·π)·phi`.
pub fn sphere_angles(index: usize, count: usize) -> SphereAngles {
    let n = count.max(1) as f64;
    let phi = (-1.0 + (2.0 * index as f64) / n).clamp(-1.0, 1.0).acos();
    let theta = (n * std::f64::consts::PI).sqrt() * phi;
    SphereAngles { phi, theta }
}

pub fn sphere_point(index: usize, count: usize, radius: f64) -> Vec3 {
    let SphereAngles { phi, theta } = sphere_angles(index, count);
    Vec3::new(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::{sphere_angles, sphere_point};

    #[test]
    fn points_lie_on_the_sphere() {
        for n in 1..=32 {
            for i in 0..n {
                let p = sphere_point(i, n, 3.0);
                assert!(
                    (p.length() - 3.0).abs() < 1e-9,
                    "point {i}/{n} at distance {}",
                    p.length()
                );
            }
        }
    }

    #[test]
    fn angles_are_unique_per_index() {
        for n in 1..=32 {
            let angles: Vec<_> = (0..n).map(|i| sphere_angles(i, n)).collect();
            for a in 0..n {
                for b in (a + 1)..n {
                    assert_ne!(angles[a], angles[b], "indices {a} and {b} of {n} collide");
                }
            }
        }
    }

    #[test]
    fn first_point_is_the_south_pole() {
        let p = sphere_point(0, 10, 3.0);
        assert!((p.z + 3.0).abs() < 1e-12);
    }
}
