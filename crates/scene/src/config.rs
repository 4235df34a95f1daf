use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// 24-bit `0xRRGGBB` color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Distance back along +z from the origin.
    pub distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightConfig {
    pub color: Color,
    pub intensity: f64,
    /// Direction from the scene towards the light.
    pub direction: Vec3,
}

/// Tunables for the stage. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub mesh_count: usize,
    /// Meshes spawn uniformly inside `[-spawn_extent, spawn_extent]³`.
    pub spawn_extent: f64,
    /// Radians added to rotation.x and rotation.y every frame.
    pub rotation_step: f64,
    /// Amplitude of the per-frame drift once the final animation is active.
    pub drift_amplitude: f64,
    pub sphere_radius: f64,
    pub transition_s: f64,
    pub mesh_color: Color,
    pub mesh_opacity: f32,
    pub background: Color,
    pub camera: CameraConfig,
    pub ambient: LightConfig,
    pub directional: DirectionalLightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh_count: 10,
            spawn_extent: 5.0,
            rotation_step: 0.01,
            drift_amplitude: 0.002,
            sphere_radius: 3.0,
            transition_s: 2.0,
            mesh_color: Color(0x666666),
            mesh_opacity: 0.7,
            background: Color(0x00000a),
            camera: CameraConfig::default(),
            ambient: LightConfig {
                color: Color(0x404040),
                intensity: 0.6,
            },
            directional: DirectionalLightConfig {
                color: Color(0xffffff),
                intensity: 0.8,
                direction: Vec3::new(1.0, 1.0, 1.0),
            },
        }
    }
}
