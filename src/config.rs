//! Viewer configuration.
//!
//! Every scene constant lives in [`ViewerConfig`]. The defaults reproduce the
//! stage the viewer always shows: a dark backdrop with teal fog, a field of
//! indigo cones and a three-light rig. Only the asset root can be overridden,
//! through `CLIP_VIEWER_ASSET_ROOT`.

use std::path::PathBuf;

/// Environment variable that points the viewer at a different asset root.
pub const ASSET_ROOT_ENV: &str = "CLIP_VIEWER_ASSET_ROOT";

/// A directional light shining from `position` towards the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub colour: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Pan in the screen plane instead of the ground plane.
    pub screen_space_panning: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
}

/// Decorative cones scattered around the character.
#[derive(Clone, Debug, PartialEq)]
pub struct ConeFieldConfig {
    pub count: usize,
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub colour: u32,
    /// Cones are placed uniformly in `[-spread / 2, spread / 2)` on x and z.
    pub spread: f32,
    pub elevation: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub asset_root: PathBuf,
    pub default_asset: String,
    pub background: u32,
    pub fog_colour: u32,
    pub fog_density: f32,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub cones: ConeFieldConfig,
    pub key_light: DirectionalLight,
    pub fill_light: DirectionalLight,
    pub ambient: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            default_asset: "Offensive Idle".to_string(),
            background: 0x323b40,
            fog_colour: 0x88ebd4,
            fog_density: 0.002,
            camera: CameraConfig {
                fovy_degrees: 60.0,
                znear: 1.0,
                zfar: 1000.0,
                position: [400.0, 200.0, 0.0],
                target: [0.0, 0.0, 0.0],
            },
            orbit: OrbitConfig {
                damping_factor: 0.05,
                min_distance: 100.0,
                max_distance: 2000.0,
                min_polar_angle: 0.0,
                max_polar_angle: std::f32::consts::FRAC_PI_2,
                screen_space_panning: false,
                rotate_speed: 1.0,
                pan_speed: 1.0,
                zoom_speed: 1.0,
                key_pan_speed: 7.0,
            },
            cones: ConeFieldConfig {
                count: 30,
                radius: 50.0,
                height: 150.0,
                radial_segments: 4,
                colour: 0x211370,
                spread: 1600.0,
                elevation: 75.0,
            },
            key_light: DirectionalLight {
                colour: 0xffffff,
                intensity: 3.0,
                position: [1.0, 1.0, 1.0],
            },
            fill_light: DirectionalLight {
                colour: 0x002288,
                intensity: 3.0,
                position: [-1.0, -1.0, -1.0],
            },
            ambient: 0x555555,
        }
    }
}

impl ViewerConfig {
    /// Defaults, with the asset root taken from `CLIP_VIEWER_ASSET_ROOT` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = std::env::var_os(ASSET_ROOT_ENV) {
            config.asset_root = PathBuf::from(root);
        }
        config
    }
}

/// Convert a `0xRRGGBB` sRGB colour into linear components.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

/// Linear clear colour for a `0xRRGGBB` sRGB value.
pub fn hex_to_clear_colour(hex: u32) -> wgpu::Color {
    let [r, g, b] = hex_to_linear(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

