//! The stage: camera, lights and the fixed pool of animated meshes.

use foundation::math::{Mat4, Vec3, sphere_point};
use foundation::time::Time;
use rand::Rng;
use runtime::Frame;
use tracing::{debug, info};

use crate::camera::{PerspectiveCamera, Viewport};
use crate::config::{Color, SceneConfig};
use crate::light::{AmbientLight, DirectionalLight};
use crate::mesh::{Material, MeshId, MeshObject};
use crate::transition::{Transition, Transitions};

#[derive(Debug)]
pub struct Stage {
    config: SceneConfig,
    viewport: Viewport,
    camera: PerspectiveCamera,
    ambient: AmbientLight,
    directional: DirectionalLight,
    meshes: Vec<MeshObject>,
    transitions: Transitions,
    final_animation: bool,
}

impl Stage {
    /// Builds the stage and populates `config.mesh_count` random meshes.
    ///
    /// The mesh pool never grows or shrinks afterwards.
    pub fn new<R: Rng>(config: SceneConfig, viewport: Viewport, rng: &mut R) -> Self {
        let material = Material {
            color: config.mesh_color,
            opacity: config.mesh_opacity,
        };
        let meshes: Vec<_> = (0..config.mesh_count)
            .map(|i| MeshObject::random(MeshId(i as u32), material, config.spawn_extent, &mut *rng))
            .collect();
        info!(count = meshes.len(), "stage populated");

        Self {
            camera: PerspectiveCamera::new(&config.camera, viewport),
            ambient: AmbientLight::from_config(&config.ambient),
            directional: DirectionalLight::from_config(&config.directional),
            viewport,
            meshes,
            transitions: Transitions::new(),
            final_animation: false,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn directional(&self) -> &DirectionalLight {
        &self.directional
    }

    pub fn background(&self) -> Color {
        self.config.background
    }

    pub fn meshes(&self) -> &[MeshObject] {
        &self.meshes
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn is_final_animation_active(&self) -> bool {
        self.final_animation
    }

    pub fn view_proj(&self) -> Mat4 {
        self.camera.view_proj()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
        debug!(width = viewport.width, height = viewport.height, "stage resized");
    }

    /// Advances every mesh by one frame.
    ///
    /// Spin and drift come first. In-flight transitions are applied last and
    /// own the position of their mesh for the frame.
    pub fn update(&mut self, frame: &Frame) {
        let step = self.config.rotation_step;
        let drift = self.final_animation.then_some(self.config.drift_amplitude);
        for (i, mesh) in self.meshes.iter_mut().enumerate() {
            mesh.rotation.x += step;
            mesh.rotation.y += step;

            if let Some(amplitude) = drift {
                let phase = frame.wall_clock_s + i as f64;
                mesh.position.x += phase.sin() * amplitude;
                mesh.position.y += phase.cos() * amplitude;
            }
        }

        self.transitions.apply(frame.time, &mut self.meshes);
    }

    /// Where mesh `index` heads when the final animation fires.
    pub fn final_target(&self, index: usize) -> Vec3 {
        sphere_point(index, self.meshes.len(), self.config.sphere_radius)
    }

    /// Enables drift and sends every mesh towards its sphere point.
    ///
    /// Each transition starts from the mesh's current position, so a repeated
    /// trigger restarts from wherever the previous one had got to.
    pub fn trigger_final_animation(&mut self, now: Time) {
        self.final_animation = true;
        let duration = self.config.transition_s;
        for index in 0..self.meshes.len() {
            let target = self.final_target(index);
            let mesh = &self.meshes[index];
            self.transitions
                .begin(mesh.id, Transition::new(mesh.position, target, now, duration));
        }
        info!(meshes = self.meshes.len(), "final animation triggered");
    }

    /// Stops the drift and abandons in-flight transitions where they are.
    pub fn reset_final_animation(&mut self) {
        self.final_animation = false;
        self.transitions.clear();
        info!("final animation reset");
    }
}

#[cfg(test)]
mod tests {
    use super::Stage;
    use crate::camera::Viewport;
    use crate::config::SceneConfig;
    use crate::mesh::MeshId;
    use foundation::math::sphere_point;
    use foundation::time::Time;
    use pretty_assertions::{assert_eq, assert_ne};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use runtime::Frame;

    fn stage() -> Stage {
        let mut rng = StdRng::seed_from_u64(1);
        Stage::new(SceneConfig::default(), Viewport::new(800.0, 600.0), &mut rng)
    }

    #[test]
    fn populates_fixed_pool_in_creation_order() {
        let s = stage();
        assert_eq!(s.meshes().len(), 10);
        for (i, m) in s.meshes().iter().enumerate() {
            assert_eq!(m.id, MeshId(i as u32));
            assert_eq!(m.material.opacity, 0.7);
        }
    }

    #[test]
    fn update_spins_without_drift_before_trigger() {
        let mut s = stage();
        let before = s.meshes().to_vec();
        s.update(&Frame::first(Time(0.0), 1000.0));
        for (a, b) in before.iter().zip(s.meshes()) {
            assert_eq!(b.position, a.position);
            assert!((b.rotation.x - a.rotation.x - 0.01).abs() < 1e-12);
            assert!((b.rotation.y - a.rotation.y - 0.01).abs() < 1e-12);
            assert_eq!(b.rotation.z, a.rotation.z);
        }
    }

    #[test]
    fn trigger_converges_meshes_on_the_sphere() {
        let mut s = stage();
        s.trigger_final_animation(Time(1.0));
        assert!(s.is_final_animation_active());
        assert_eq!(s.transitions().len(), 10);

        s.update(&Frame::first(Time(3.0), 123.0));
        assert!(s.transitions().is_empty());
        for (i, m) in s.meshes().iter().enumerate() {
            assert_eq!(m.position, sphere_point(i, 10, 3.0));
        }
    }

    #[test]
    fn drift_does_not_offset_an_in_flight_transition() {
        let mut s = stage();
        s.trigger_final_animation(Time(0.0));
        let expected: Vec<_> = s
            .meshes()
            .iter()
            .map(|m| s.transitions().get(m.id).unwrap().position_at(Time(0.7)))
            .collect();

        s.update(&Frame::first(Time(0.7), 42.0));
        let positions: Vec<_> = s.meshes().iter().map(|m| m.position).collect();
        assert_eq!(positions, expected);

        // Once landed, drift moves the meshes again.
        s.update(&Frame::first(Time(2.0), 42.0));
        s.update(&Frame::first(Time(2.1), 42.0));
        for (i, m) in s.meshes().iter().enumerate() {
            assert_ne!(m.position, sphere_point(i, 10, 3.0));
        }
    }

    #[test]
    fn retrigger_restarts_from_current_position_with_latest_target() {
        let mut s = stage();
        s.trigger_final_animation(Time(0.0));
        s.update(&Frame::first(Time(0.5), 0.0));
        let mid: Vec<_> = s.meshes().iter().map(|m| m.position).collect();

        s.trigger_final_animation(Time(0.5));
        for (i, m) in s.meshes().iter().enumerate() {
            let t = s.transitions().get(m.id).unwrap();
            assert_eq!(t.from, mid[i]);
            assert_eq!(t.to, sphere_point(i, 10, 3.0));
            assert_eq!(t.span.start, Time(0.5));
        }
    }

    #[test]
    fn resize_keeps_meshes_and_transitions() {
        let mut s = stage();
        s.trigger_final_animation(Time(0.0));
        let before = s.meshes().to_vec();
        s.resize(Viewport::new(1920.0, 1080.0));
        assert_eq!(s.meshes(), before.as_slice());
        assert_eq!(s.transitions().len(), 10);
        assert!((s.camera().aspect - 1920.0 / 1080.0).abs() < 1e-12);
    }

    #[test]
    fn reset_stops_drift_and_clears_transitions() {
        let mut s = stage();
        s.trigger_final_animation(Time(0.0));
        s.reset_final_animation();
        assert!(!s.is_final_animation_active());
        assert!(s.transitions().is_empty());

        let before: Vec<_> = s.meshes().iter().map(|m| m.position).collect();
        s.update(&Frame::first(Time(0.1), 5.0));
        let after: Vec<_> = s.meshes().iter().map(|m| m.position).collect();
        assert_eq!(before, after);
    }
}
