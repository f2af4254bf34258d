use std::path::Path;
use std::process;
use std::rc::Rc;

use anyhow::{Context, Result, bail};

use tile_runner::{
    config::HostConfig,
    loaders::{FsLoader, Loader},
    player::Player,
    renderer::{DisplayObject, HeadlessSurface},
    runner::Runner,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "tile-runner play <project-dir>";
const CHECK_USAGE: &str = "tile-runner check <project-dir> [ticks]";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let dir = args.next().context(PLAY_USAGE)?;
            play(&dir)
        }
        Some("check") => {
            let dir = args.next().context(CHECK_USAGE)?;
            let ticks = match args.next() {
                Some(n) => n.parse().with_context(|| format!("Invalid tick count '{n}'"))?,
                None => 60,
            };
            check(&dir, ticks)
        }
        _ => bail!("tile-runner: scripted tile and sprite animation\n\nUsage:\n  {PLAY_USAGE}\n  {CHECK_USAGE}"),
    }
}

/// Projects are served from their own directory, so the project path seen by
/// the runner is the loader root.
fn project_loader(dir: &str) -> Result<Rc<dyn Loader>> {
    if !Path::new(dir).is_dir() {
        bail!("{dir} is not a directory");
    }
    Ok(Rc::new(FsLoader::new(dir)))
}

fn play(dir: &str) -> Result<()> {
    let loader = project_loader(dir)?;
    let mut player = Player::new();
    let mut runner = Runner::load("/", loader, HostConfig::load(), &mut player)
        .with_context(|| format!("Failed to start {dir}"))?;
    player.play(&mut runner)
}

fn check(dir: &str, ticks: u32) -> Result<()> {
    let loader = project_loader(dir)?;
    let host = HostConfig::load();
    let mut surface = HeadlessSurface::new(host.width, host.height);
    let mut runner =
        Runner::load("/", loader, host, &mut surface).with_context(|| format!("Failed to start {dir}"))?;

    for _ in 0..ticks {
        runner.tick(1.0)?;
    }

    let Some(app) = runner.renderer() else {
        bail!("{dir}: renderer was not created");
    };
    let app = app.borrow();
    let view = app.view();
    eprintln!("{dir}: {}x{} cells, {} ticks", view.width, view.height, ticks);
    for (i, child) in app.stage().children().iter().enumerate() {
        match child {
            DisplayObject::Tilemap(display) => {
                let display = display.borrow();
                eprintln!(
                    "  #{i} tilemap {} tiles, t={:.2}, texture {} ({})",
                    display.tiles().len(),
                    display.time(),
                    display.texture().url(),
                    if display.texture().is_loaded() { "loaded" } else { "pending" },
                );
            }
            DisplayObject::Sprite(sprite) => {
                let sprite = sprite.borrow();
                eprintln!(
                    "  #{i} sprite '{}', t={:.2}, texture {} ({})",
                    sprite.current_sprite(),
                    sprite.time(),
                    sprite.texture().url(),
                    if sprite.texture().is_loaded() { "loaded" } else { "pending" },
                );
            }
        }
    }
    eprintln!("  {} ticker callbacks", app.ticker().len());
    Ok(())
}
