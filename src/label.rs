use glam::{Mat4, Vec2};

use crate::scene::SceneObject;

/// Screen-space annotation layer, the counterpart of the original's DOM label
/// renderer: it projects labeled objects to viewport coordinates and is
/// resized together with the main renderer.
#[derive(Debug)]
pub struct LabelOverlay {
    width: u32,
    height: u32,
    labels: Vec<String>,
}

/// A label anchored to an object's projected position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub name: String,
    pub position: Vec2,
    /// False when the anchor is behind the camera or outside the frustum.
    pub visible: bool,
}

impl LabelOverlay {
    pub fn new(width: u32, height: u32, labels: Vec<String>) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            labels,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Projects every labeled object through the camera matrix.
    pub fn project(&self, objects: &[SceneObject], view_proj: Mat4) -> Vec<ScreenLabel> {
        self.labels
            .iter()
            .filter_map(|label| {
                let object = objects.iter().find(|o| &o.name == label)?;
                let clip = view_proj * object.position.extend(1.0);
                if clip.w <= f32::EPSILON {
                    return Some(ScreenLabel {
                        name: label.clone(),
                        position: Vec2::ZERO,
                        visible: false,
                    });
                }
                let ndc = clip.truncate() / clip.w;
                let position = Vec2::new(
                    (ndc.x * 0.5 + 0.5) * self.width as f32,
                    (1.0 - (ndc.y * 0.5 + 0.5)) * self.height as f32,
                );
                let visible = ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z);
                Some(ScreenLabel {
                    name: label.clone(),
                    position,
                    visible,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::scene::{showcase_scene, MaterialClass, SceneObject, Shape};
    use glam::Vec3;

    fn board_at_origin() -> Vec<SceneObject> {
        vec![SceneObject::new(
            "board",
            Shape::Box { size: Vec3::ONE },
            MaterialClass::Glossy,
        )]
    }

    #[test]
    fn resize_tracks_the_viewport() {
        let mut overlay = LabelOverlay::new(1280, 720, vec![]);
        overlay.resize(640, 480);
        assert_eq!(overlay.size(), (640, 480));
        overlay.resize(0, 0);
        assert_eq!(overlay.size(), (1, 1));
    }

    #[test]
    fn object_in_front_of_the_camera_projects_near_the_center() {
        let camera = OrbitCamera::new(showcase_scene().camera, 1000, 1000);
        let overlay = LabelOverlay::new(1000, 1000, vec!["board".into()]);
        let labels = overlay.project(&board_at_origin(), camera.view_proj());
        assert_eq!(labels.len(), 1);
        let label = &labels[0];
        assert!(label.visible);
        assert!(label.position.x > 300.0 && label.position.x < 700.0);
        assert!(label.position.y > 300.0 && label.position.y < 700.0);
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let camera = OrbitCamera::new(showcase_scene().camera, 100, 100);
        let overlay = LabelOverlay::new(100, 100, vec!["ghost".into()]);
        assert!(overlay
            .project(&board_at_origin(), camera.view_proj())
            .is_empty());
    }

    #[test]
    fn objects_behind_the_camera_are_invisible() {
        let camera = OrbitCamera::new(showcase_scene().camera, 100, 100);
        let mut objects = board_at_origin();
        // push the anchor far behind the camera
        objects[0].position = Vec3::new(0.0, 1.0, 100.0);
        let labels = overlay_project(&camera, &objects);
        assert!(!labels[0].visible);
    }

    fn overlay_project(camera: &OrbitCamera, objects: &[SceneObject]) -> Vec<ScreenLabel> {
        LabelOverlay::new(100, 100, vec!["board".into()]).project(objects, camera.view_proj())
    }
}
