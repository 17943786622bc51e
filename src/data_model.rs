use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::scene::SceneObject;

/// Thread-safe container mirroring the mutable state of the scene graph.
///
/// The frame driver, the asset loader thread and the physics sync all talk to
/// the same store; the renderer takes snapshots.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl DataModel {
    /// Creates an empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data model from an initial set of objects.
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
        }
    }

    /// Appends an object, replacing any existing object of the same name.
    pub fn insert(&self, object: SceneObject) {
        let mut guard = self.objects.write();
        if let Some(existing) = guard.iter_mut().find(|o| o.name == object.name) {
            *existing = object;
        } else {
            guard.push(object);
        }
    }

    /// Removes the named object. Returns whether anything was removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut guard = self.objects.write();
        let before = guard.len();
        guard.retain(|object| object.name != name);
        guard.len() != before
    }

    /// Returns a snapshot of all stored objects.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    /// Returns a clone of the requested object.
    pub fn get(&self, name: &str) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.name == name)?;
        Some(updater(object))
    }

    pub fn set_transform(&self, name: &str, position: Vec3, rotation: Vec3) -> bool {
        self.update(name, |obj| {
            obj.position = position;
            obj.rotation = rotation;
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MaterialClass, Shape};

    fn make_object(name: &str) -> SceneObject {
        SceneObject::new(name, Shape::Sphere { radius: 0.1 }, MaterialClass::Matte)
    }

    #[test]
    fn insert_replaces_same_name() {
        let model = DataModel::new();
        model.insert(make_object("ball1"));
        model.insert(make_object("ball1").at(Vec3::Y));
        assert_eq!(model.len(), 1);
        assert_eq!(model.get("ball1").unwrap().position, Vec3::Y);
    }

    #[test]
    fn remove_reports_presence() {
        let model = DataModel::from_objects(vec![make_object("ball1")]);
        assert!(model.remove("ball1"));
        assert!(!model.remove("ball1"));
        assert!(model.is_empty());
    }

    #[test]
    fn set_transform_updates_object() {
        let model = DataModel::from_objects(vec![make_object("ball1")]);
        assert!(model.set_transform("ball1", Vec3::X, Vec3::new(0.0, 90.0, 0.0)));
        let ball = model.get("ball1").unwrap();
        assert_eq!(ball.position, Vec3::X);
        assert_eq!(ball.rotation.y, 90.0);
    }

    #[test]
    fn set_transform_ignores_missing_object() {
        let model = DataModel::new();
        assert!(!model.set_transform("ghost", Vec3::X, Vec3::ZERO));
    }
}
