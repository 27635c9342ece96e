//! Integration tests for the madl-export binary

mod common;

use common::*;
use madl_common::{AnimationFile, ModelFile, PhysicsFile, TextureFile};
use madl_export::SceneModel;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_madl-export"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run madl-export")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "madl-export failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_scene(dir: &Path, name: &str, scene: &SceneModel) {
    let json = serde_json::to_string_pretty(scene).expect("Failed to serialize scene");
    std::fs::write(dir.join(name), json).expect("Failed to write scene");
}

#[test]
fn test_export_subcommand() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scene(dir.path(), "hero.scene.json", &two_bone_scene());
    write_png(&dir.path().join("skin.png"));

    let output = run(
        &["export", "hero.scene.json", "--checksum", "-12"],
        dir.path(),
    );
    assert_success(&output);

    let model = std::fs::read(dir.path().join("hero.madl")).expect("No .madl written");
    let model = ModelFile::from_bytes(&model).unwrap();
    assert_eq!(model.header.container.checksum, -12);
    assert_eq!(model.bones.len(), 2);
    assert_eq!(model.rigid_meshes[0].texture, 1);

    let textures = std::fs::read(dir.path().join("hero.mtex")).expect("No .mtex written");
    let textures = TextureFile::from_bytes(&textures).unwrap();
    assert_eq!(textures.textures.len(), 1);

    let animation = std::fs::read(dir.path().join("hero.mani")).expect("No .mani written");
    assert_eq!(AnimationFile::from_bytes(&animation).unwrap().sequences.len(), 1);

    assert!(!dir.path().join("hero.mphy").exists());
}

#[test]
fn test_export_flags() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scene(
        dir.path(),
        "hero.json",
        &with_physics_proxy(two_bone_scene()),
    );

    let output = run(
        &[
            "export",
            "hero.json",
            "-o",
            "out/character",
            "--no-textures",
            "--no-animation",
            "--physics",
        ],
        dir.path(),
    );
    assert_success(&output);

    let out = dir.path().join("out");
    assert!(out.join("character.madl").exists());
    assert!(!out.join("character.mtex").exists());
    assert!(!out.join("character.mani").exists());
    let physics = std::fs::read(out.join("character.mphy")).expect("No .mphy written");
    assert_eq!(PhysicsFile::from_bytes(&physics).unwrap().hulls.len(), 2);
}

#[test]
fn test_build_from_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join("scenes")).unwrap();
    write_scene(&dir.path().join("scenes"), "hero.json", &two_bone_scene());
    write_png(&dir.path().join("scenes/skin.png"));
    std::fs::write(
        dir.path().join("export.toml"),
        r#"
[scene]
path = "scenes/hero.json"

[output]
dir = "build"

[export]
checksum = 5
fps = 12
"#,
    )
    .unwrap();

    let output = run(&["check"], dir.path());
    assert_success(&output);

    let output = run(&["build"], dir.path());
    assert_success(&output);

    let build = dir.path().join("build");
    let model = ModelFile::from_bytes(&std::fs::read(build.join("hero.madl")).unwrap()).unwrap();
    assert_eq!(model.header.container.checksum, 5);
    let animation =
        AnimationFile::from_bytes(&std::fs::read(build.join("hero.mani")).unwrap()).unwrap();
    assert_eq!(animation.sequences[0].fps, 12);
    assert!(build.join("hero.mtex").exists());

    // Output override
    let output = run(&["build", "export.toml", "-o", "elsewhere"], dir.path());
    assert_success(&output);
    assert!(dir.path().join("elsewhere/hero.madl").exists());
}

#[test]
fn test_check_rejects_missing_scene() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("export.toml"),
        "[scene]\npath = \"missing.json\"\n",
    )
    .unwrap();

    let output = run(&["check"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn test_configuration_error_fails_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut scene = two_bone_scene();
    scene.armatures.clear();
    write_scene(dir.path(), "empty.json", &scene);

    let output = run(&["export", "empty.json"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No armature"));
    assert!(!dir.path().join("empty.madl").exists());
}

#[test]
fn test_inspect() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_scene(dir.path(), "hero.json", &two_bone_scene());
    assert_success(&run(
        &["export", "hero.json", "--no-textures", "--checksum", "3"],
        dir.path(),
    ));

    let output = run(&["inspect", "hero.madl"], dir.path());
    assert_success(&output);
    // tracing writes to stdout by default
    let log = String::from_utf8_lossy(&output.stdout);
    assert!(log.contains("madl v1 checksum 3"), "unexpected output: {}", log);
    assert!(log.contains("'rig': 2 bones"));

    std::fs::write(dir.path().join("junk.madl"), b"nope").unwrap();
    assert!(!run(&["inspect", "junk.madl"], dir.path()).status.success());
}
