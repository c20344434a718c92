use glam::{Vec3, Vec4};
use tidewater_common::{GpuMeshHandle, ProgramHandle, TextureHandle, Transform};

/// Program and surface parameters for one draw. Opaque to the scene itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub program: ProgramHandle,
    pub texture: TextureHandle,
    pub ambient: Vec4,
    pub diffuse: Vec4,
}

/// Where a point light's intensity comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightIntensity {
    Fixed(f32),
    /// Index into the session's flicker channels.
    Channel(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: LightIntensity,
}

/// One mesh at one placement.
///
/// The same mesh handle may appear in several entries; each entry owns
/// its transform exclusively.
#[derive(Debug, Clone)]
pub struct SceneEntry {
    pub name: String,
    pub mesh: GpuMeshHandle,
    pub material: Material,
    pub transform: Transform,
    pub light: Option<PointLight>,
}

/// Flat, ordered list of scene entries.
///
/// No parent/child relationships. Entries are drawn in insertion order and
/// live for the whole session.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    entries: Vec<SceneEntry>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, entry: SceneEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [SceneEntry] {
        &mut self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SceneEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&SceneEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every entry's derived transform state.
    pub fn recompute_all(&mut self) {
        for entry in &mut self.entries {
            entry.transform.recompute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, mesh: u64, x: f32) -> SceneEntry {
        SceneEntry {
            name: name.to_string(),
            mesh: GpuMeshHandle(mesh),
            material: Material {
                program: ProgramHandle(1),
                texture: TextureHandle(1),
                ambient: Vec4::ONE,
                diffuse: Vec4::ONE,
            },
            transform: Transform::placed(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, Vec3::ONE),
            light: None,
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let mut scene = SceneGraph::new();
        assert!(scene.is_empty());
        assert_eq!(scene.push(entry("a", 1, 0.0)), 0);
        assert_eq!(scene.push(entry("b", 2, 0.0)), 1);
        assert_eq!(scene.push(entry("c", 1, 0.0)), 2);
        let names: Vec<_> = scene.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn shared_mesh_keeps_separate_transforms() {
        let mut scene = SceneGraph::new();
        scene.push(entry("dirt 0", 7, 101.0));
        scene.push(entry("dirt 1", 7, 151.0));
        scene.recompute_all();
        let a = scene.get(0).unwrap();
        let b = scene.get(1).unwrap();
        assert_eq!(a.mesh, b.mesh);
        assert_eq!(a.transform.matrix().w_axis.x, 101.0);
        assert_eq!(b.transform.matrix().w_axis.x, 151.0);
    }

    #[test]
    fn recompute_all_refreshes_mutated_entries() {
        let mut scene = SceneGraph::new();
        scene.push(entry("boat", 1, 0.0));
        scene.recompute_all();
        scene.entries_mut()[0].transform.position.y = 13.0;
        assert_eq!(scene.entries()[0].transform.matrix().w_axis.y, 0.0);
        scene.recompute_all();
        assert_eq!(scene.find("boat").unwrap().transform.matrix().w_axis.y, 13.0);
    }
}
