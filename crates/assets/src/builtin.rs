//! Built-in meshes and the harbor demo scene.
//!
//! Lets the binaries and tests run without any files on disk.

use glam::Vec3;
use std::collections::BTreeMap;

use crate::manifest::{
    IntensitySpec, LightSpec, MaterialSpec, PlacementSpec, ProgramKind, SceneManifest, SkySpec,
    WaterSpec,
};
use crate::source::MemoryAssetSource;

/// Unit cube centred on the origin, one quad per side.
pub const CUBE_OBJ: &str = "\
# unit cube
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
f 6/1 5/2 8/3 7/4
f 2/1 6/2 7/3 3/4
f 5/1 1/2 4/3 8/4
f 4/1 3/2 7/3 8/4
f 5/1 6/2 2/3 1/4
";

/// Unit quad in the XY plane facing +Z.
pub const QUAD_OBJ: &str = "\
# unit quad
v -0.5 -0.5 0
v 0.5 -0.5 0
v 0.5 0.5 0
v -0.5 0.5 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

pub const CUBE_PATH: &str = "builtin/cube.obj";
pub const QUAD_PATH: &str = "builtin/quad.obj";

/// Source holding the built-in meshes under [`CUBE_PATH`] and [`QUAD_PATH`].
pub fn builtin_source() -> MemoryAssetSource {
    let mut source = MemoryAssetSource::new();
    source.insert_text(CUBE_PATH, CUBE_OBJ);
    source.insert_text(QUAD_PATH, QUAD_OBJ);
    source
}

fn lit(diffuse: [f32; 3]) -> MaterialSpec {
    MaterialSpec {
        diffuse: Vec3::from(diffuse).extend(1.0),
        ..MaterialSpec::default()
    }
}

fn place(name: &str, mesh: &str, material: &str, position: [f32; 3]) -> PlacementSpec {
    PlacementSpec {
        name: name.to_string(),
        mesh: mesh.to_string(),
        material: material.to_string(),
        position: Vec3::from(position),
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
        light: None,
    }
}

fn lamp(position: [f32; 3], channel: &str) -> Option<LightSpec> {
    Some(LightSpec {
        position: Vec3::from(position),
        intensity: IntensitySpec::Flicker(channel.to_string()),
    })
}

fn candle(name: &str, position: [f32; 3], light: [f32; 3], channel: &str) -> PlacementSpec {
    PlacementSpec {
        scale: Vec3::new(0.3, 1.0, 0.3),
        light: lamp(light, channel),
        ..place(name, "cube", "wax", position)
    }
}

/// Dirt slab centres and depths, in draw order.
const DIRT_SLABS: [([f32; 3], f32); 4] = [
    ([101.0, 13.0, 26.0], 50.0),
    ([151.0, 13.0, 26.0], 50.0),
    ([101.0, 13.0, -26.0], 53.0),
    ([151.0, 13.0, -26.0], 53.0),
];

/// A small harbor: a pier with a boat moored at its end, a cabin on a
/// grassy bank over four dirt slabs, and two flickering candles. The sky
/// is drawn after all of them.
pub fn demo_manifest() -> SceneManifest {
    let meshes = BTreeMap::from([
        ("cube".to_string(), CUBE_PATH.to_string()),
        ("quad".to_string(), QUAD_PATH.to_string()),
    ]);
    let materials = BTreeMap::from([
        ("hull".to_string(), lit([0.45, 0.3, 0.18])),
        ("timber".to_string(), lit([0.6, 0.45, 0.3])),
        ("wax".to_string(), lit([0.95, 0.9, 0.8])),
        ("grass".to_string(), lit([0.3, 0.55, 0.2])),
        ("dirt".to_string(), lit([0.4, 0.3, 0.2])),
        (
            "water".to_string(),
            MaterialSpec {
                program: ProgramKind::Water,
                ..MaterialSpec::default()
            },
        ),
    ]);

    let mut placements = vec![
        // Piles below the waterline, deck just above it.
        PlacementSpec {
            scale: Vec3::new(6.0, 26.0, 40.0),
            light: lamp([10.0, 18.0, 41.0], "boat"),
            ..place("pier", "cube", "timber", [0.0, 2.0, 0.0])
        },
        PlacementSpec {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::new(3.0, 2.0, 8.0),
            light: lamp([14.0, 16.0, 41.0], "boat"),
            ..place("boat", "cube", "hull", [5.0, 13.0, 50.0])
        },
        PlacementSpec {
            rotation: Vec3::new(0.0, -90.0, 0.0),
            scale: Vec3::new(12.0, 8.0, 10.0) * 0.7,
            light: lamp([132.0, 40.0, -12.0], "cabin"),
            ..place("cabin", "cube", "timber", [126.0, 21.0, 0.0])
        },
        candle("boat candle", [9.0, 17.5, 44.0], [12.0, 20.0, 44.0], "boat"),
        candle(
            "cabin candle",
            [132.0, 30.6, -12.0],
            [132.0, 32.0, -12.0],
            "cabin",
        ),
        PlacementSpec {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::new(4.0, 1.0, 3.0),
            light: lamp([132.0, 32.0, -12.0], "cabin"),
            ..place("table", "cube", "timber", [132.0, 25.0, -12.0])
        },
        PlacementSpec {
            rotation: Vec3::new(-90.0, 0.0, 0.0),
            scale: Vec3::new(48.0, 50.0, 1.0),
            ..place("grass", "quad", "grass", [125.0, 23.0, 0.0])
        },
    ];
    // One dirt mesh placed four times.
    for (i, (position, depth)) in DIRT_SLABS.into_iter().enumerate() {
        placements.push(PlacementSpec {
            scale: Vec3::new(50.0, 19.0, depth),
            ..place(&format!("dirt {i}"), "cube", "dirt", position)
        });
    }

    SceneManifest {
        meshes,
        textures: BTreeMap::new(),
        materials,
        placements,
        water: WaterSpec {
            mesh: "quad".to_string(),
            position: Vec3::new(0.0, 13.0, 0.0),
            rotation: Vec3::new(-90.0, 0.0, 0.0),
            scale: Vec3::new(190.0, 190.0, 1.0),
            ripple: None,
        },
        sky: Some(SkySpec::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetSource;
    use crate::obj::MeshBuilder;

    #[test]
    fn cube_builds_closed_box() {
        let mesh = MeshBuilder::new().build(CUBE_OBJ).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.degenerate_vertex_count(), 0);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::splat(-0.5));
        assert_eq!(max, Vec3::splat(0.5));
        for v in mesh.vertices() {
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
            // Smoothed normals still point away from the centre.
            assert!(v.normal.dot(v.position) > 0.0);
        }
    }

    #[test]
    fn quad_faces_positive_z() {
        let mesh = MeshBuilder::new().build(QUAD_OBJ).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.has_texcoords());
        for v in mesh.vertices() {
            assert!((v.normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn demo_manifest_is_valid_and_resolvable() {
        let manifest = demo_manifest();
        manifest.validate().unwrap();
        let source = builtin_source();
        for path in manifest.meshes.values() {
            assert!(source.read_text(path).is_ok());
        }
        assert_eq!(manifest.flicker_channels(), vec!["boat", "cabin"]);
        assert_eq!(manifest.water.position.y, 13.0);
        assert!(manifest.sky.is_some());

        let names: Vec<&str> = manifest.placements.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "pier",
                "boat",
                "cabin",
                "boat candle",
                "cabin candle",
                "table",
                "grass",
                "dirt 0",
                "dirt 1",
                "dirt 2",
                "dirt 3",
            ]
        );

        let pier = &manifest.placements[0];
        assert_eq!(pier.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(
            pier.light.as_ref().map(|l| l.position),
            Some(Vec3::new(10.0, 18.0, 41.0))
        );

        let slabs: Vec<(Vec3, Vec3)> = manifest
            .placements
            .iter()
            .filter(|p| p.material == "dirt")
            .map(|p| (p.position, p.scale))
            .collect();
        assert_eq!(
            slabs,
            [
                (Vec3::new(101.0, 13.0, 26.0), Vec3::new(50.0, 19.0, 50.0)),
                (Vec3::new(151.0, 13.0, 26.0), Vec3::new(50.0, 19.0, 50.0)),
                (Vec3::new(101.0, 13.0, -26.0), Vec3::new(50.0, 19.0, 53.0)),
                (Vec3::new(151.0, 13.0, -26.0), Vec3::new(50.0, 19.0, 53.0)),
            ]
        );
    }

    #[test]
    fn candles_share_channels_with_their_rooms() {
        let manifest = demo_manifest();
        let channel_of = |name: &str| {
            manifest
                .placements
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.light.as_ref())
                .map(|l| l.intensity.clone())
        };
        let boat = Some(IntensitySpec::Flicker("boat".into()));
        let cabin = Some(IntensitySpec::Flicker("cabin".into()));
        assert_eq!(channel_of("pier"), boat);
        assert_eq!(channel_of("boat candle"), boat);
        assert_eq!(channel_of("table"), cabin);
        assert_eq!(channel_of("grass"), None);
    }
}
