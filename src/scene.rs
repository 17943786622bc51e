use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Runtime description of a demo scene: the visual objects plus the global
/// parameters (lighting, atmosphere, camera) the renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub hemisphere: HemisphereLight,
    pub directionals: Vec<DirectionalLight>,
    pub background: Vec3,
    pub fog: Fog,
    pub camera: CameraConfig,
}

/// Geometry carried by a scene object.
///
/// `Mesh` shapes reference an STL asset on disk; the renderer resolves the
/// path lazily and keeps the parsed buffers cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { size: Vec3 },
    Sphere { radius: f32 },
    Mesh { asset: String },
}

/// Shading class applied to an object, mirroring the material families the
/// demos use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialClass {
    /// Diffuse-only surface (ground plane).
    Matte,
    /// Diffuse plus a specular highlight (the board).
    Glossy,
    /// Partially transparent panel (the cover).
    Translucent,
    /// Colored by surface normal, unlit (the balls).
    NormalShaded,
}

/// Visual object as assembled at startup or spawned at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    #[serde(default = "default_color")]
    pub color: Vec3,
    pub material: MaterialClass,
    #[serde(default)]
    pub position: Vec3,
    /// Euler rotation in degrees, applied Z * Y * X.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, shape: Shape, material: MaterialClass) -> Self {
        Self {
            name: name.into(),
            shape,
            color: default_color(),
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// Sky/ground ambient pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky: Vec3,
    pub ground: Vec3,
    pub intensity: f32,
}

/// Directional light positioned relative to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Linear distance fog blended towards the background color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

/// Static camera and orbit-control parameters for a demo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
}

/// Asset the showcase demo loads for the board visual.
pub const SHOWCASE_MODEL: &str = "models/board_visual.stl";
/// Asset the pinball demo loads for the board collider and visual.
pub const PINBALL_MODEL: &str = "models/board_collider.stl";

/// Board placement shared by both demos.
pub const BOARD_POSITION: Vec3 = Vec3::new(0.0, 0.3, 0.0);
pub const BOARD_ROTATION: Vec3 = Vec3::new(180.0, 180.0, 0.0);

const BACKGROUND: Vec3 = Vec3::new(0x72 as f32 / 255.0, 0x64 as f32 / 255.0, 0x5b as f32 / 255.0);
const BOARD_COLOR: Vec3 = Vec3::new(1.0, 0.41, 0.71); // hot pink

fn base_camera() -> CameraConfig {
    CameraConfig {
        fov_deg: 35.0,
        near: 1.0,
        far: 15.0,
        position: Vec3::new(0.0, 1.0, 4.5),
        target: Vec3::new(0.05, 0.0, 0.0),
        min_distance: 3.0,
        max_distance: 6.0,
        max_polar: std::f32::consts::FRAC_PI_2,
        min_azimuth: -std::f32::consts::FRAC_PI_6,
        max_azimuth: std::f32::consts::FRAC_PI_6,
    }
}

fn ground() -> SceneObject {
    SceneObject::new(
        "ground",
        Shape::Box {
            size: Vec3::new(40.0, 0.5, 40.0),
        },
        MaterialClass::Matte,
    )
    .with_color(Vec3::splat(0.796))
    .at(Vec3::new(0.0, -0.75, 0.0))
}

fn cover() -> SceneObject {
    SceneObject::new(
        "cover",
        Shape::Box {
            size: Vec3::new(0.76, 1.4, 0.05),
        },
        MaterialClass::Translucent,
    )
    .with_color(Vec3::ONE)
    .at(Vec3::new(0.0, 0.19, 0.111))
}

/// The board mesh object installed once the asset finishes loading.
pub fn board_object(asset: &str) -> SceneObject {
    SceneObject::new(
        "board",
        Shape::Mesh {
            asset: asset.to_string(),
        },
        MaterialClass::Glossy,
    )
    .with_color(BOARD_COLOR)
    .at(BOARD_POSITION)
    .rotated(BOARD_ROTATION)
}

/// Assembles the static board viewer scene.
pub fn showcase_scene() -> Scene {
    Scene {
        objects: vec![ground(), cover()],
        hemisphere: HemisphereLight {
            sky: Vec3::new(0.553, 0.486, 0.486),
            ground: Vec3::new(0.286, 0.286, 0.4),
            intensity: 3.0,
        },
        directionals: vec![
            DirectionalLight {
                position: Vec3::new(1.0, 1.0, 1.0),
                color: Vec3::ONE,
                intensity: 3.5,
            },
            DirectionalLight {
                position: Vec3::new(0.5, 1.0, -1.0),
                color: Vec3::new(1.0, 0.835, 0.0),
                intensity: 3.0,
            },
        ],
        background: BACKGROUND,
        fog: Fog {
            color: BACKGROUND,
            near: 2.0,
            far: 18.0,
        },
        camera: base_camera(),
    }
}

/// Assembles the physics demo scene. The ground doubles as a static body and
/// the board collider is registered once the asset loads.
pub fn pinball_scene() -> Scene {
    Scene {
        objects: vec![ground(), cover()],
        hemisphere: HemisphereLight {
            sky: Vec3::new(0.553, 0.486, 0.486),
            ground: Vec3::new(0.286, 0.286, 0.4),
            intensity: 3.0,
        },
        directionals: vec![
            DirectionalLight {
                position: Vec3::new(0.95, 1.0, 1.6),
                color: Vec3::ONE,
                intensity: 3.0,
            },
            DirectionalLight {
                position: Vec3::new(0.95, 1.0, -1.0),
                color: Vec3::new(1.0, 0.835, 0.0),
                intensity: 2.0,
            },
        ],
        background: BACKGROUND,
        fog: Fog {
            color: BACKGROUND,
            near: 2.0,
            far: 18.0,
        },
        camera: {
            let mut camera = base_camera();
            camera.target = Vec3::new(0.1, 0.0, 0.0);
            camera
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_demos_share_ground_and_cover() {
        for scene in [showcase_scene(), pinball_scene()] {
            let names: Vec<_> = scene.objects.iter().map(|o| o.name.as_str()).collect();
            assert_eq!(names, vec!["ground", "cover"]);
        }
    }

    #[test]
    fn fog_matches_background() {
        let scene = pinball_scene();
        assert_eq!(scene.fog.color, scene.background);
        assert!(scene.fog.near < scene.fog.far);
    }

    #[test]
    fn camera_orbit_limits_are_symmetric() {
        let camera = showcase_scene().camera;
        assert_eq!(camera.min_azimuth, -camera.max_azimuth);
        assert!(camera.min_distance < camera.max_distance);
        assert_eq!(camera.fov_deg, 35.0);
    }

    #[test]
    fn board_object_uses_the_requested_asset() {
        let board = board_object("models/custom.stl");
        match &board.shape {
            Shape::Mesh { asset } => assert_eq!(asset, "models/custom.stl"),
            other => panic!("expected mesh shape, got {other:?}"),
        }
        assert_eq!(board.position, BOARD_POSITION);
        assert_eq!(board.rotation, BOARD_ROTATION);
    }
}
