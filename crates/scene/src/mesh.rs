use foundation::math::Vec3;
use rand::Rng;

use crate::config::Color;

/// Stable identity of a mesh; equal to its creation ordinal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(pub u32);

impl MeshId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
    Cone,
    Cylinder,
    Tetrahedron,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
        ShapeKind::Tetrahedron,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// The primitive's fixed dimensions.
    pub fn primitive(self) -> Primitive {
        match self {
            ShapeKind::Box => Primitive::Box { size: 0.5 },
            ShapeKind::Sphere => Primitive::Sphere {
                radius: 0.3,
                width_segments: 16,
                height_segments: 16,
            },
            ShapeKind::Cone => Primitive::Cone {
                radius: 0.3,
                height: 0.6,
                radial_segments: 8,
            },
            ShapeKind::Cylinder => Primitive::Cylinder {
                radius: 0.2,
                height: 0.6,
                radial_segments: 8,
            },
            ShapeKind::Tetrahedron => Primitive::Tetrahedron { radius: 0.4 },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Primitive {
    Box {
        size: f64,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Cone {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    Cylinder {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    Tetrahedron {
        radius: f64,
    },
}

/// Per-instance surface parameters. Each mesh owns its own copy.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshObject {
    pub id: MeshId,
    pub shape: ShapeKind,
    pub material: Material,
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
}

impl MeshObject {
    /// A mesh with a random shape, position in `[-extent, extent]³` and
    /// rotation in `[0, 2π)³`.
    pub fn random<R: Rng>(
        id: MeshId,
        material: Material,
        extent: f64,
        rng: &mut R,
    ) -> Self {
        let extent = extent.abs();
        let mut coord = || {
            if extent > 0.0 {
                rng.gen_range(-extent..=extent)
            } else {
                0.0
            }
        };
        let position = Vec3::new(coord(), coord(), coord());

        let tau = std::f64::consts::TAU;
        let rotation = Vec3::new(
            rng.gen_range(0.0..tau),
            rng.gen_range(0.0..tau),
            rng.gen_range(0.0..tau),
        );

        Self {
            id,
            shape: ShapeKind::random(rng),
            material,
            position,
            rotation,
        }
    }
}
