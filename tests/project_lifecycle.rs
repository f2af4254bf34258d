use std::fs;
use std::path::Path;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use tile_runner::config::HostConfig;
use tile_runner::error::{RuntimeError, ScriptError};
use tile_runner::loaders::{FsLoader, Loader};
use tile_runner::renderer::HeadlessSurface;
use tile_runner::renderer::defaults::ScaleMode;
use tile_runner::runner::{Runner, RunnerState};
use tile_runner::types::Color;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

const CONFIG: &str = r#"{
    "rendering": {
        "application": {"resizeTo": "none", "width": 8, "height": 1, "background": {"r": 0, "g": 0, "b": 0}},
        "defaults": {"baseTexture": {"scaleMode": "nearest"}}
    }
}"#;

const TILES: &str = r#"{
    "texture": "./tiles.png",
    "tileSize": [2, 2],
    "gridSize": [2, 1],
    "animatedTiles": {
        "0,0": {"fps": 1, "framesPosition": [0, 0], "axis": "x", "numFrames": 2}
    }
}"#;

const HERO: &str = r#"{
    "texture": "./hero.png",
    "sprites": {
        "walk": {"animated": true, "location": [0, 0], "size": [1, 1], "frameCount": 2, "frameGrid": [2, 1]}
    }
}"#;

const SCENE: &str = r#"
    let tileset = Tileset.load("/assets/tiles.json");
    let tilemap = TilesetDisplay.create(tileset);
    let sheet = SpriteSheet.load("/assets/hero.json");
    let hero = Sprite.create(sheet);
    hero.set_position(6.0, 0.0);

    renderer.stage().add_child(tilemap);
    renderer.stage().add_child(hero);
    renderer.ticker().add(|delta| {
        tilemap.step(delta);
        hero.step(delta);
    });

    return sheet.sprite_names().len();
"#;

fn write_project(script: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("assets")).unwrap();
    fs::write(root.join("config.json"), CONFIG).unwrap();
    fs::write(root.join("main.rhai"), script).unwrap();
    fs::write(root.join("assets/tiles.json"), TILES).unwrap();
    fs::write(root.join("assets/hero.json"), HERO).unwrap();

    // left tile red, right tile green
    RgbaImage::from_fn(4, 2, |x, _| Rgba(if x < 2 { RED } else { GREEN }))
        .save(root.join("assets/tiles.png"))
        .unwrap();
    RgbaImage::from_fn(2, 1, |x, _| Rgba(if x == 0 { BLUE } else { WHITE }))
        .save(root.join("assets/hero.png"))
        .unwrap();
    dir
}

fn start(root: &Path) -> Result<Runner, RuntimeError> {
    let loader: Rc<dyn Loader> = Rc::new(FsLoader::new(root));
    let mut surface = HeadlessSurface::new(80, 24);
    Runner::load("/", loader, HostConfig::default(), &mut surface)
}

fn rgb([r, g, b, _]: [u8; 4]) -> Option<Color> {
    Some(Color::Rgb { r, g, b })
}

#[test]
fn scene_animates_through_the_ticker() {
    let project = write_project(SCENE);
    let mut runner = start(project.path()).unwrap();
    assert_eq!(runner.state(), RunnerState::Running);

    let cells = runner.render().unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].len(), 8);
    assert_eq!(cells[0][0].style.fg, rgb(RED));
    assert_eq!(cells[0][2].style.fg, rgb(GREEN));
    assert_eq!(cells[0][6].style.fg, rgb(BLUE));
    assert_eq!(cells[0][6].style.bg, Some(Color::Rgb { r: 0, g: 0, b: 0 }));

    runner.tick(1.0).unwrap();
    let cells = runner.render().unwrap();
    // the animated tile moved to its second frame, the static one did not
    assert_eq!(cells[0][0].style.fg, rgb(GREEN));
    assert_eq!(cells[0][2].style.fg, rgb(GREEN));
    assert_eq!(cells[0][6].style.fg, rgb(WHITE));

    runner.tick(1.0).unwrap();
    let cells = runner.render().unwrap();
    assert_eq!(cells[0][0].style.fg, rgb(RED));
    assert_eq!(cells[0][6].style.fg, rgb(BLUE));
}

#[test]
fn script_value_is_returned_from_run() {
    let project = write_project(SCENE);
    let loader: Rc<dyn Loader> = Rc::new(FsLoader::new(project.path()));
    let mut surface = HeadlessSurface::new(80, 24);
    let mut runner = Runner::new("/", loader);
    runner.load_manifest().unwrap();
    runner.initialize_renderer(&mut surface).unwrap();
    runner.build_namespace().unwrap();
    assert_eq!(runner.run().unwrap().as_int(), Ok(1));
}

#[test]
fn utility_capabilities_are_usable() {
    let project = write_project(
        r#"
        let manifest = Loader.json("/assets/tiles.json");
        if manifest.tileSize[0] != 2 { throw "bad json"; }
        if Path.filename("/assets/tiles.json") != "tiles.json" { throw "bad filename"; }
        if Path.directory("/assets/tiles.json") != "/assets/" { throw "bad directory"; }
        if !Path.is_relative("./x.png") { throw "bad is_relative"; }
        if Defaults.scale_mode() != "nearest" { throw "bad defaults"; }
        Defaults.set_scale_mode("linear");
        Loader.text("/main.rhai").len() > 0
        "#,
    );
    let runner = start(project.path()).unwrap();
    let app = runner.renderer().unwrap();
    assert_eq!(app.borrow().defaults.base_texture.scale_mode, ScaleMode::Linear);
}

#[test]
fn unknown_names_stop_the_script() {
    let project = write_project("let t = Tileset.load(\"/assets/tiles.json\");\nCamera.follow(t);");
    let err = start(project.path()).err().unwrap();
    assert!(
        matches!(err, RuntimeError::Script(ScriptError::UnresolvedIdentifier(ref name)) if name == "Camera"),
        "{err}"
    );
}

#[test]
fn unknown_sprite_names_are_script_errors() {
    let project = write_project(
        r#"
        let hero = Sprite.create(SpriteSheet.load("/assets/hero.json"));
        hero.set_sprite("jump");
        "#,
    );
    let err = start(project.path()).err().unwrap();
    assert!(matches!(err, RuntimeError::Script(ScriptError::Runtime(ref msg)) if msg.contains("jump")), "{err}");
}

#[test]
fn missing_manifest_fails_before_anything_runs() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.rhai"), "1").unwrap();
    let err = start(dir.path()).err().unwrap();
    assert!(matches!(err, RuntimeError::ManifestLoad(_)), "{err}");
}
