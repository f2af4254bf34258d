//! The engine surface project scripts see.
//!
//! Every capability is a small handle type registered with the Rhai engine.
//! Namespace entries are pushed as constants, so every method takes its
//! receiver by value; the handles are `Rc` clones and share state.

use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, FLOAT, FnPtr, INT, Map};

use super::namespace::NamespaceBuilder;
use crate::loaders::{Loader, ManifestSource};
use crate::path;
use crate::renderer::defaults::ScaleMode;
use crate::renderer::{Application, DisplayObject, Shared, Stage, Ticker, shared};
use crate::sprites::{Sprite, SpriteSheet, SpriteSheetManifest};
use crate::tiles::{Tileset, TilesetDisplay, TilesetManifest};

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

fn to_script_error(e: impl std::fmt::Display) -> Box<EvalAltResult> {
    e.to_string().into()
}

fn to_u32(value: INT, what: &str) -> ScriptResult<u32> {
    u32::try_from(value).map_err(|_| format!("{what} must be a non-negative integer, got {value}").into())
}

/// `Tileset.load(url)` / `Tileset.load(#{ ... })`.
#[derive(Clone)]
pub struct TilesetFactory {
    loader: Rc<dyn Loader>,
}

/// `TilesetDisplay.create(tileset)`.
#[derive(Clone)]
pub struct TilesetDisplayFactory;

/// `SpriteSheet.load(url)` / `SpriteSheet.load(#{ ... })`.
#[derive(Clone)]
pub struct SpriteSheetFactory {
    loader: Rc<dyn Loader>,
}

/// `Sprite.create(sheet)`.
#[derive(Clone)]
pub struct SpriteFactory;

/// Raw document access: `Loader.json(url)`, `Loader.text(url)`.
#[derive(Clone)]
pub struct LoaderApi {
    loader: Rc<dyn Loader>,
}

/// URL helpers: `Path.filename`, `Path.directory`, `Path.is_relative`, `Path.join`.
#[derive(Clone)]
pub struct PathApi;

/// Live view of the renderer defaults.
#[derive(Clone)]
pub struct DefaultsApi {
    app: Shared<Application>,
}

/// The standard capability set for one application.
pub fn engine_namespace(app: Shared<Application>, loader: Rc<dyn Loader>) -> NamespaceBuilder {
    NamespaceBuilder::new()
        .with("renderer", app.clone())
        .with(
            "Tileset",
            TilesetFactory {
                loader: loader.clone(),
            },
        )
        .with("TilesetDisplay", TilesetDisplayFactory)
        .with(
            "SpriteSheet",
            SpriteSheetFactory {
                loader: loader.clone(),
            },
        )
        .with("Sprite", SpriteFactory)
        .with("Loader", LoaderApi { loader })
        .with("Path", PathApi)
        .with("Defaults", DefaultsApi { app })
}

pub fn register_api(engine: &mut Engine) {
    register_renderer(engine);
    register_tiles(engine);
    register_sprites(engine);
    register_utilities(engine);
}

fn register_renderer(engine: &mut Engine) {
    engine.register_type_with_name::<Shared<Application>>("Application");
    engine.register_fn("stage", |app: Shared<Application>| app.borrow().stage().clone());
    engine.register_fn("ticker", |app: Shared<Application>| app.borrow().ticker().clone());
    engine.register_fn("width", |app: Shared<Application>| INT::from(app.borrow().view().width));
    engine.register_fn("height", |app: Shared<Application>| INT::from(app.borrow().view().height));

    engine.register_type_with_name::<Stage>("Stage");
    engine.register_fn("add_child", |stage: Stage, display: Shared<TilesetDisplay>| {
        stage.add_child(DisplayObject::Tilemap(display));
    });
    engine.register_fn("add_child", |stage: Stage, sprite: Shared<Sprite>| {
        stage.add_child(DisplayObject::Sprite(sprite));
    });
    engine.register_fn("len", |stage: Stage| stage.len() as INT);

    engine.register_type_with_name::<Ticker>("Ticker");
    engine.register_fn("add", |ticker: Ticker, callback: FnPtr| ticker.add(callback));
    engine.register_fn("len", |ticker: Ticker| ticker.len() as INT);
}

fn register_tiles(engine: &mut Engine) {
    engine.register_type_with_name::<TilesetFactory>("TilesetFactory");
    engine.register_fn("load", |f: TilesetFactory, url: &str| -> ScriptResult<Rc<Tileset>> {
        Tileset::load(ManifestSource::Url(url.to_string()), f.loader.as_ref())
            .map(Rc::new)
            .map_err(to_script_error)
    });
    engine.register_fn("load", |f: TilesetFactory, manifest: Map| -> ScriptResult<Rc<Tileset>> {
        let manifest: TilesetManifest = rhai::serde::from_dynamic(&Dynamic::from_map(manifest))?;
        Tileset::load(ManifestSource::Inline(manifest), f.loader.as_ref())
            .map(Rc::new)
            .map_err(to_script_error)
    });

    engine.register_type_with_name::<Rc<Tileset>>("Tileset");
    engine.register_fn("grid_width", |t: Rc<Tileset>| INT::from(t.grid_size().x));
    engine.register_fn("grid_height", |t: Rc<Tileset>| INT::from(t.grid_size().y));
    engine.register_fn("tile_width", |t: Rc<Tileset>| INT::from(t.tile_size().x));
    engine.register_fn("tile_height", |t: Rc<Tileset>| INT::from(t.tile_size().y));
    engine.register_fn("animated_tile_count", |t: Rc<Tileset>| t.animated_tile_count() as INT);

    engine.register_type_with_name::<TilesetDisplayFactory>("TilesetDisplayFactory");
    engine.register_fn("create", |_: TilesetDisplayFactory, t: Rc<Tileset>| {
        shared(TilesetDisplay::new(&t))
    });
    engine.register_fn("empty", |_: TilesetDisplayFactory, t: Rc<Tileset>| {
        shared(TilesetDisplay::empty(t.texture().clone()))
    });

    engine.register_type_with_name::<Shared<TilesetDisplay>>("TilesetDisplay");
    engine.register_fn("step", |d: Shared<TilesetDisplay>| d.borrow_mut().step(1.0));
    engine.register_fn("step", |d: Shared<TilesetDisplay>, frames: FLOAT| d.borrow_mut().step(frames));
    engine.register_fn("step", |d: Shared<TilesetDisplay>, frames: INT| d.borrow_mut().step(frames as f64));
    engine.register_fn("time", |d: Shared<TilesetDisplay>| d.borrow().time());
    engine.register_fn("tile_count", |d: Shared<TilesetDisplay>| d.borrow().tiles().len() as INT);
    engine.register_fn(
        "add_tile",
        |d: Shared<TilesetDisplay>, t: Rc<Tileset>, tile_col: INT, tile_row: INT, grid_col: INT, grid_row: INT| -> ScriptResult<()> {
            d.borrow_mut().add_tile(
                &t,
                to_u32(tile_col, "tile column")?,
                to_u32(tile_row, "tile row")?,
                to_u32(grid_col, "grid column")?,
                to_u32(grid_row, "grid row")?,
            );
            Ok(())
        },
    );
    engine.register_fn("set_position", |d: Shared<TilesetDisplay>, x: FLOAT, y: FLOAT| {
        let mut d = d.borrow_mut();
        d.transform.x = x;
        d.transform.y = y;
    });
    engine.register_fn("set_scale", |d: Shared<TilesetDisplay>, x: FLOAT, y: FLOAT| {
        let mut d = d.borrow_mut();
        d.transform.scale_x = x;
        d.transform.scale_y = y;
    });
}

fn register_sprites(engine: &mut Engine) {
    engine.register_type_with_name::<SpriteSheetFactory>("SpriteSheetFactory");
    engine.register_fn("load", |f: SpriteSheetFactory, url: &str| -> ScriptResult<Rc<SpriteSheet>> {
        SpriteSheet::load(ManifestSource::Url(url.to_string()), f.loader.as_ref())
            .map(Rc::new)
            .map_err(to_script_error)
    });
    engine.register_fn("load", |f: SpriteSheetFactory, manifest: Map| -> ScriptResult<Rc<SpriteSheet>> {
        let manifest: SpriteSheetManifest = rhai::serde::from_dynamic(&Dynamic::from_map(manifest))?;
        SpriteSheet::load(ManifestSource::Inline(manifest), f.loader.as_ref())
            .map(Rc::new)
            .map_err(to_script_error)
    });

    engine.register_type_with_name::<Rc<SpriteSheet>>("SpriteSheet");
    engine.register_fn("sprite_names", |s: Rc<SpriteSheet>| -> Array {
        s.sprite_names().map(|name| Dynamic::from(name.to_string())).collect()
    });
    engine.register_fn("contains", |s: Rc<SpriteSheet>, name: &str| s.contains(name));
    engine.register_fn("frame_count", |s: Rc<SpriteSheet>, name: &str| -> ScriptResult<INT> {
        s.frame_count(name).map(|n| n as INT).map_err(to_script_error)
    });

    engine.register_type_with_name::<SpriteFactory>("SpriteFactory");
    engine.register_fn("create", |_: SpriteFactory, sheet: Rc<SpriteSheet>| -> ScriptResult<Shared<Sprite>> {
        Sprite::new(sheet).map(shared).map_err(to_script_error)
    });

    engine.register_type_with_name::<Shared<Sprite>>("Sprite");
    engine.register_fn("set_sprite", |s: Shared<Sprite>, name: &str| -> ScriptResult<()> {
        s.borrow_mut().set_sprite(name).map_err(to_script_error)
    });
    engine.register_fn("current_sprite", |s: Shared<Sprite>| s.borrow().current_sprite().to_string());
    engine.register_fn("step", |s: Shared<Sprite>| -> ScriptResult<()> {
        s.borrow_mut().step(1.0).map_err(to_script_error)
    });
    engine.register_fn("step", |s: Shared<Sprite>, frames: FLOAT| -> ScriptResult<()> {
        s.borrow_mut().step(frames).map_err(to_script_error)
    });
    engine.register_fn("step", |s: Shared<Sprite>, frames: INT| -> ScriptResult<()> {
        s.borrow_mut().step(frames as f64).map_err(to_script_error)
    });
    engine.register_fn("time", |s: Shared<Sprite>| s.borrow().time());
    engine.register_fn("set_position", |s: Shared<Sprite>, x: FLOAT, y: FLOAT| {
        let mut s = s.borrow_mut();
        s.transform.x = x;
        s.transform.y = y;
    });
    engine.register_fn("set_scale", |s: Shared<Sprite>, x: FLOAT, y: FLOAT| {
        let mut s = s.borrow_mut();
        s.transform.scale_x = x;
        s.transform.scale_y = y;
    });
}

fn register_utilities(engine: &mut Engine) {
    engine.register_type_with_name::<LoaderApi>("Loader");
    engine.register_fn("json", |l: LoaderApi, url: &str| -> ScriptResult<Dynamic> {
        let value = l.loader.load_json(url).map_err(to_script_error)?;
        rhai::serde::to_dynamic(value)
    });
    engine.register_fn("text", |l: LoaderApi, url: &str| -> ScriptResult<String> {
        l.loader.load_text(url).map_err(to_script_error)
    });

    engine.register_type_with_name::<PathApi>("Path");
    engine.register_fn("filename", |_: PathApi, url: &str| path::filename(url).to_string());
    engine.register_fn("directory", |_: PathApi, url: &str| path::directory(url));
    engine.register_fn("is_relative", |_: PathApi, url: &str| path::is_relative(url));
    engine.register_fn("join", |_: PathApi, base: &str, url: &str| path::join(base, url));

    engine.register_type_with_name::<DefaultsApi>("Defaults");
    engine.register_fn("scale_mode", |d: DefaultsApi| {
        d.app.borrow().defaults.base_texture.scale_mode.name().to_string()
    });
    engine.register_fn("set_scale_mode", |d: DefaultsApi, name: &str| -> ScriptResult<()> {
        let mode: ScaleMode = name.parse().map_err(to_script_error)?;
        d.app.borrow_mut().defaults.base_texture.scale_mode = mode;
        Ok(())
    });
    engine.register_fn("resolution", |d: DefaultsApi| {
        INT::from(d.app.borrow().defaults.bitmap_font.resolution)
    });
}
