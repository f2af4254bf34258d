use std::path::PathBuf;
use std::rc::Rc;

use tile_runner::config::HostConfig;
use tile_runner::loaders::{FsLoader, Loader};
use tile_runner::renderer::{DisplayObject, HeadlessSurface};
use tile_runner::runner::Runner;

fn meadow() -> Runner {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/meadow");
    let loader: Rc<dyn Loader> = Rc::new(FsLoader::new(root));
    let mut surface = HeadlessSurface::new(100, 40);
    Runner::load("/", loader, HostConfig::default(), &mut surface).unwrap()
}

#[test]
fn meadow_builds_its_scene() {
    let runner = meadow();
    let app = runner.renderer().unwrap();
    let app = app.borrow();

    assert_eq!(app.view().width, 80);
    assert_eq!(app.view().height, 12);
    assert_eq!(app.ticker().len(), 1);

    let children = app.stage().children();
    let [DisplayObject::Tilemap(map), DisplayObject::Sprite(critter)] = children.as_slice() else {
        panic!("unexpected stage {children:?}");
    };
    assert_eq!(map.borrow().tiles().len(), 30);
    assert!(map.borrow().texture().is_loaded());
    assert_eq!(critter.borrow().current_sprite(), "walk");
    assert!(critter.borrow().frame().is_some());
}

#[test]
fn meadow_keeps_moving() {
    let mut runner = meadow();
    let first = runner.render().unwrap();
    for _ in 0..40 {
        runner.tick(1.0).unwrap();
    }
    assert_ne!(runner.render().unwrap(), first);

    let app = runner.renderer().unwrap();
    let children = app.borrow().stage().children();
    let DisplayObject::Sprite(critter) = &children[1] else {
        panic!("critter missing");
    };
    let critter = critter.borrow();
    assert_eq!(critter.time(), 40.0);
    assert!((critter.transform.x - 14.0).abs() < 1e-9);
}

#[test]
fn water_and_critter_share_the_tick_clock() {
    let mut runner = meadow();
    for _ in 0..20 {
        runner.tick(1.0).unwrap();
    }

    let app = runner.renderer().unwrap();
    let children = app.borrow().stage().children();
    let DisplayObject::Tilemap(map) = &children[0] else {
        panic!("map missing");
    };
    let map = map.borrow();
    assert_eq!(map.time(), 20.0);
    // the water tile has turned over exactly once
    let water = map.tiles().iter().find(|t| t.params.is_animated()).unwrap();
    assert_eq!(water.params.region_at(map.time()).x, 24);
}
