//! Procedural triangle meshes for the stage primitives.
//!
//! All meshes are centered on the origin, indexed with `u16`, and wound
//! counter-clockwise when seen from outside.

use foundation::math::Vec3;
use scene::Primitive;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u16 {
        self.vertices.push(Vertex {
            position: position.to_f32(),
            normal: normal.normalize().to_f32(),
        });
        (self.vertices.len() - 1) as u16
    }

    fn tri(&mut self, a: u16, b: u16, c: u16) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

pub fn build_primitive(primitive: Primitive) -> MeshData {
    match primitive {
        Primitive::Box { size } => box_mesh(size),
        Primitive::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere_mesh(radius, width_segments, height_segments),
        Primitive::Cone {
            radius,
            height,
            radial_segments,
        } => cylinder_mesh(0.0, radius, height, radial_segments),
        Primitive::Cylinder {
            radius,
            height,
            radial_segments,
        } => cylinder_mesh(radius, radius, height, radial_segments),
        Primitive::Tetrahedron { radius } => tetrahedron_mesh(radius),
    }
}

/// Axis-aligned cube with hard edges: four vertices per face.
pub fn box_mesh(size: f64) -> MeshData {
    let h = size * 0.5;
    // (normal, u, v) with u x v == normal.
    let faces = [
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    ];

    let mut mesh = MeshData::default();
    for (n, u, v) in faces {
        let center = n.scale(h);
        let corners = [
            center - u.scale(h) - v.scale(h),
            center + u.scale(h) - v.scale(h),
            center + u.scale(h) + v.scale(h),
            center - u.scale(h) + v.scale(h),
        ];
        let [a, b, c, d] = corners.map(|p| mesh.push(p, n));
        mesh.tri(a, b, c);
        mesh.tri(a, c, d);
    }
    mesh
}

/// UV sphere; `width_segments` around the equator, `height_segments` pole to pole.
pub fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> MeshData {
    let lat_segments = height_segments.max(2);
    let lon_segments = width_segments.max(3);

    let mut mesh = MeshData::default();
    for lat in 0..=lat_segments {
        let theta = lat as f64 / lat_segments as f64 * std::f64::consts::PI;
        for lon in 0..=lon_segments {
            let phi = lon as f64 / lon_segments as f64 * std::f64::consts::TAU;
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.push(n.scale(radius), n);
        }
    }

    let stride = lon_segments + 1;
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let i0 = (lat * stride + lon) as u16;
            let i1 = i0 + 1;
            let i2 = i0 + stride as u16;
            let i3 = i2 + 1;
            if lat != 0 {
                mesh.tri(i0, i1, i2);
            }
            if lat != lat_segments - 1 {
                mesh.tri(i1, i3, i2);
            }
        }
    }
    mesh
}

/// Capped (possibly tapered) cylinder along the y axis. A zero top radius
/// gives a cone.
pub fn cylinder_mesh(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: u32,
) -> MeshData {
    let segments = radial_segments.max(3);
    let half = height * 0.5;
    let slope = if height > 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };

    let mut mesh = MeshData::default();
    let ring = |mesh: &mut MeshData, radius: f64, y: f64| -> Vec<u16> {
        (0..=segments)
            .map(|x| {
                let theta = x as f64 / segments as f64 * std::f64::consts::TAU;
                let (sin, cos) = theta.sin_cos();
                mesh.push(
                    Vec3::new(radius * sin, y, radius * cos),
                    Vec3::new(sin, slope, cos),
                )
            })
            .collect()
    };
    let top = ring(&mut mesh, radius_top, half);
    let bottom = ring(&mut mesh, radius_bottom, -half);

    for x in 0..segments as usize {
        let (a, b, c, d) = (top[x], bottom[x], bottom[x + 1], top[x + 1]);
        if radius_top > 0.0 {
            mesh.tri(a, b, d);
        }
        if radius_bottom > 0.0 {
            mesh.tri(b, c, d);
        }
    }

    cap(&mut mesh, radius_top, half, segments, true);
    cap(&mut mesh, radius_bottom, -half, segments, false);
    mesh
}

fn cap(mesh: &mut MeshData, radius: f64, y: f64, segments: u32, top: bool) {
    if radius <= 0.0 {
        return;
    }
    let normal = Vec3::new(0.0, if top { 1.0 } else { -1.0 }, 0.0);
    let center = mesh.push(Vec3::new(0.0, y, 0.0), normal);
    let first = mesh.vertices.len() as u16;
    for x in 0..=segments {
        let theta = x as f64 / segments as f64 * std::f64::consts::TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push(Vec3::new(radius * sin, y, radius * cos), normal);
    }
    for x in 0..segments as u16 {
        let (i, j) = (first + x, first + x + 1);
        if top {
            mesh.tri(i, j, center);
        } else {
            mesh.tri(j, i, center);
        }
    }
}

/// Regular tetrahedron with flat faces.
pub fn tetrahedron_mesh(radius: f64) -> MeshData {
    let corners = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ]
    .map(|p| p.normalize().scale(radius));
    let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];

    let mut mesh = MeshData::default();
    for [a, b, c] in faces {
        let (pa, pb, pc) = (corners[a], corners[b], corners[c]);
        let n = (pb - pa).cross(pc - pa);
        let ia = mesh.push(pa, n);
        let ib = mesh.push(pb, n);
        let ic = mesh.push(pc, n);
        mesh.tri(ia, ib, ic);
    }
    mesh
}
