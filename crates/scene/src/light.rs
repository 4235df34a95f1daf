use foundation::math::Vec3;

use crate::config::{Color, DirectionalLightConfig, LightConfig};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f64,
}

impl AmbientLight {
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            color: config.color,
            intensity: config.intensity,
        }
    }

    /// Premultiplied `color * intensity`, ready for a shader uniform.
    pub fn radiance(&self) -> [f32; 3] {
        scale_rgb(self.color.rgb(), self.intensity as f32)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f64,
    /// Unit vector pointing from the scene towards the light.
    pub direction: Vec3,
}

impl DirectionalLight {
    pub fn from_config(config: &DirectionalLightConfig) -> Self {
        Self {
            color: config.color,
            intensity: config.intensity,
            direction: config.direction.normalize(),
        }
    }

    pub fn radiance(&self) -> [f32; 3] {
        scale_rgb(self.color.rgb(), self.intensity as f32)
    }
}

fn scale_rgb(rgb: [f32; 3], s: f32) -> [f32; 3] {
    [rgb[0] * s, rgb[1] * s, rgb[2] * s]
}
