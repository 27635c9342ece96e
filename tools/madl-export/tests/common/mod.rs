//! Scene builders shared by the integration tests

#![allow(dead_code)]

use glam::{Mat4, Vec3};
use madl_export::scene::{
    Armature, BoneSample, Influence, Material, MeshRole, PoseTrack, SceneBone, SceneMesh,
    SceneModel, SceneTriangle, SceneVertex,
};
use std::path::{Path, PathBuf};

pub fn full(group: usize) -> Vec<Influence> {
    vec![Influence { group, weight: 1.0 }]
}

pub fn vertex(position: [f32; 3], influences: Vec<Influence>) -> SceneVertex {
    SceneVertex {
        position,
        normal: [0.0, 0.0, 1.0],
        uv: [position[0], position[1]],
        influences,
    }
}

pub fn triangle(vertices: [usize; 3], material: Option<usize>) -> SceneTriangle {
    SceneTriangle { vertices, material }
}

pub fn mesh(name: &str, groups: &[&str], vertices: Vec<SceneVertex>) -> SceneMesh {
    let triangles = (0..vertices.len() / 3)
        .map(|t| triangle([3 * t, 3 * t + 1, 3 * t + 2], Some(0)))
        .collect();
    SceneMesh {
        name: name.into(),
        role: MeshRole::Render,
        world: Mat4::IDENTITY.to_cols_array_2d(),
        vertex_groups: groups.iter().map(|g| g.to_string()).collect(),
        vertices,
        triangles,
    }
}

/// root at the origin, child one unit up
pub fn two_bone_armature() -> Armature {
    Armature {
        name: "rig".into(),
        bones: vec![
            SceneBone {
                name: "root".into(),
                parent: None,
                head: [0.0; 3],
                matrix: Mat4::IDENTITY.to_cols_array_2d(),
            },
            SceneBone {
                name: "child".into(),
                parent: Some(0),
                head: [0.0, 1.0, 0.0],
                matrix: Mat4::from_translation(Vec3::Y).to_cols_array_2d(),
            },
        ],
    }
}

/// Two-frame track where only the child's rotX moves by 0.1 rad
pub fn wave_track() -> PoseTrack {
    let rest = BoneSample::default();
    let raised = BoneSample {
        location: [0.0; 3],
        rotation: [0.1, 0.0, 0.0],
    };
    PoseTrack {
        name: "wave".into(),
        first_frame: 0,
        fps: None,
        frames: vec![vec![rest, rest], vec![rest, raised]],
    }
}

/// Two bones, one rigid triangle on the root, one "skin" material, one track
pub fn two_bone_scene() -> SceneModel {
    SceneModel {
        armatures: vec![two_bone_armature()],
        meshes: vec![mesh(
            "body",
            &["root", "child"],
            vec![
                vertex([0.0, 0.0, 0.0], full(0)),
                vertex([1.0, 0.0, 0.0], full(0)),
                vertex([0.0, 1.0, 0.0], full(0)),
            ],
        )],
        materials: vec![Material {
            name: "skin".into(),
            base_color: Some(PathBuf::from("skin.png")),
            emission: None,
        }],
        animations: vec![wave_track()],
        fps: 24,
    }
}

/// Adds a collision proxy with one group per bone
pub fn with_physics_proxy(mut scene: SceneModel) -> SceneModel {
    let mut proxy = mesh(
        "body_phy",
        &["root", "child"],
        vec![
            vertex([0.0, 0.0, 0.0], full(0)),
            vertex([0.5, 0.0, 0.0], full(0)),
            vertex([0.0, 1.5, 0.0], full(1)),
        ],
    );
    proxy.triangles.clear();
    scene.meshes.push(proxy);
    scene
}

/// Write a small real PNG
pub fn write_png(path: &Path) {
    let img = image::RgbaImage::from_fn(4, 4, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    });
    img.save(path).expect("Failed to write PNG");
}
