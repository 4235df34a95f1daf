use foundation::math::{Mat4, mat4_from_translation_euler_xyz};
use scene::{MeshId, ShapeKind, Stage};

/// Per-frame shader constants. `vec4` slots keep the layout valid for WebGL
/// uniform buffers.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: Mat4,
    /// Ambient radiance (rgb).
    pub ambient: [f32; 4],
    /// Unit vector towards the directional light (xyz).
    pub light_dir: [f32; 4],
    /// Directional radiance (rgb).
    pub light_color: [f32; 4],
}

/// Per-mesh vertex-buffer data.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    pub model: Mat4,
    /// Straight (non-premultiplied) rgba.
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshId,
    pub shape: ShapeKind,
    pub instance: Instance,
    /// Distance from the camera to the mesh origin.
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub clear_color: [f64; 4],
    pub globals: Globals,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    /// Instance data in draw order.
    pub fn instances(&self) -> Vec<Instance> {
        self.commands.iter().map(|c| c.instance).collect()
    }
}

pub struct Renderer;

impl Renderer {
    /// Snapshots the stage for drawing.
    ///
    /// Meshes are translucent, so commands are ordered back to front; equal
    /// depths keep creation order.
    pub fn collect(stage: &Stage) -> RenderFrame {
        let eye = stage.camera().position;

        let mut commands: Vec<DrawCommand> = stage
            .meshes()
            .iter()
            .map(|mesh| {
                let [r, g, b] = mesh.material.color.rgb();
                DrawCommand {
                    mesh: mesh.id,
                    shape: mesh.shape,
                    instance: Instance {
                        model: mat4_from_translation_euler_xyz(mesh.position, mesh.rotation),
                        color: [r, g, b, mesh.material.opacity],
                    },
                    depth: (mesh.position - eye).length(),
                }
            })
            .collect();
        commands.sort_by(|a, b| b.depth.total_cmp(&a.depth).then(a.mesh.cmp(&b.mesh)));

        let [br, bg, bb] = stage.background().rgb();
        let ambient = stage.ambient().radiance();
        let light = stage.directional();
        let dir = light.direction.to_f32();
        let radiance = light.radiance();

        RenderFrame {
            clear_color: [br as f64, bg as f64, bb as f64, 1.0],
            globals: Globals {
                view_proj: stage.view_proj(),
                ambient: [ambient[0], ambient[1], ambient[2], 0.0],
                light_dir: [dir[0], dir[1], dir[2], 0.0],
                light_color: [radiance[0], radiance[1], radiance[2], 0.0],
            },
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use runtime::Frame;
    use scene::{SceneConfig, Stage, Viewport};

    fn stage() -> Stage {
        let mut rng = StdRng::seed_from_u64(11);
        Stage::new(SceneConfig::default(), Viewport::new(1280.0, 720.0), &mut rng)
    }

    #[test]
    fn collects_one_command_per_mesh_back_to_front() {
        let frame = Renderer::collect(&stage());
        assert_eq!(frame.commands.len(), 10);
        for pair in frame.commands.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
        for cmd in &frame.commands {
            assert!((cmd.instance.color[3] - 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn globals_follow_camera_and_lights() {
        let mut s = stage();
        let frame = Renderer::collect(&s);
        assert_eq!(frame.globals.view_proj, s.view_proj());
        assert_eq!(frame.clear_color, [0.0, 0.0, (10.0f32 / 255.0) as f64, 1.0]);

        s.resize(Viewport::new(600.0, 600.0));
        assert!(Renderer::collect(&s).globals.view_proj != frame.globals.view_proj);
    }

    #[test]
    fn model_matrix_tracks_mesh_position() {
        let mut s = stage();
        s.trigger_final_animation(Time(0.0));
        s.update(&Frame::first(Time(5.0), 0.0));
        let frame = Renderer::collect(&s);
        for cmd in &frame.commands {
            let mesh = &s.meshes()[cmd.mesh.index()];
            let t = cmd.instance.model[3];
            assert!((t[0] as f64 - mesh.position.x).abs() < 1e-5);
            assert!((t[1] as f64 - mesh.position.y).abs() < 1e-5);
            assert!((t[2] as f64 - mesh.position.z).abs() < 1e-5);
        }
    }
}
