//! Runner: loads a project and drives it through its lifecycle.
//!
//! Stages run strictly in order:
//!
//! ```text
//! Idle -> ManifestLoaded -> RendererReady -> NamespaceBuilt -> Running
//! ```
//!
//! A stage called out of order fails with `RuntimeError::Lifecycle`. A stage
//! that fails keeps the previous state and retains nothing it loaded. The one
//! exception is a script that fails after it started running: its effects on
//! the renderer stay, and no second script may run on this runner.

use std::rc::Rc;

use rhai::Dynamic;
use serde::{Deserialize, Serialize};

use crate::config::HostConfig;
use crate::error::{Result, RuntimeError};
use crate::loaders::{Loader, load_document};
use crate::renderer::defaults::DefaultOverrides;
use crate::renderer::{Application, ApplicationOptions, Shared, Surface, shared};
use crate::script::{CapabilityNamespace, ScriptHost, engine_namespace};
use crate::types::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    ManifestLoaded,
    RendererReady,
    NamespaceBuilt,
    Running,
}

/// `<project>/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    #[serde(default)]
    pub rendering: RenderingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingConfig {
    #[serde(default)]
    pub application: ApplicationOptions,
    #[serde(default)]
    pub defaults: DefaultOverrides,
}

pub struct Runner {
    project_path: String,
    loader: Rc<dyn Loader>,
    host: HostConfig,
    state: RunnerState,
    manifest: Option<ProjectManifest>,
    source: Option<String>,
    renderer: Option<Shared<Application>>,
    namespace: Option<CapabilityNamespace>,
    script: ScriptHost,
}

impl Runner {
    pub fn new(project_path: impl Into<String>, loader: Rc<dyn Loader>) -> Self {
        Self::with_host(project_path, loader, HostConfig::default())
    }

    pub fn with_host(project_path: impl Into<String>, loader: Rc<dyn Loader>, host: HostConfig) -> Self {
        Self {
            project_path: project_path.into(),
            loader,
            host,
            state: RunnerState::Idle,
            manifest: None,
            source: None,
            renderer: None,
            namespace: None,
            script: ScriptHost::new(),
        }
    }

    /// Run every stage and start the project script.
    pub fn load(
        project_path: impl Into<String>,
        loader: Rc<dyn Loader>,
        host: HostConfig,
        surface: &mut dyn Surface,
    ) -> Result<Runner> {
        let mut runner = Runner::with_host(project_path, loader, host);
        runner.load_manifest()?;
        runner.initialize_renderer(surface)?;
        runner.build_namespace()?;
        runner.run()?;
        Ok(runner)
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    pub fn manifest(&self) -> Option<&ProjectManifest> {
        self.manifest.as_ref()
    }

    pub fn renderer(&self) -> Option<Shared<Application>> {
        self.renderer.clone()
    }

    pub fn namespace(&self) -> Option<&CapabilityNamespace> {
        self.namespace.as_ref()
    }

    fn require(&self, operation: &'static str, allowed: &[RunnerState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RuntimeError::Lifecycle {
                operation,
                state: self.state,
            })
        }
    }

    fn project_url(&self, file: &str) -> String {
        format!("{}/{}", self.project_path.trim_end_matches('/'), file)
    }

    /// Fetch the project manifest and script source.
    pub fn load_manifest(&mut self) -> Result<()> {
        self.require("load the manifest", &[RunnerState::Idle])?;

        let manifest_url = self.project_url(&self.host.manifest_file);
        let script_url = self.project_url(&self.host.script_file);
        log::debug!("loading project manifest {manifest_url}");
        let manifest: ProjectManifest = load_document(self.loader.as_ref(), &manifest_url)?;
        let source = self.loader.load_text(&script_url)?;

        self.manifest = Some(manifest);
        self.source = Some(source);
        self.state = RunnerState::ManifestLoaded;
        Ok(())
    }

    /// Create the application, apply the manifest's renderer defaults and
    /// mount it on `surface`. Calling it again re-creates and re-mounts.
    pub fn initialize_renderer(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.require(
            "initialize the renderer",
            &[RunnerState::ManifestLoaded, RunnerState::RendererReady],
        )?;
        let Some(manifest) = &self.manifest else {
            return Err(RuntimeError::Lifecycle {
                operation: "initialize the renderer",
                state: self.state,
            });
        };

        let options = manifest
            .rendering
            .application
            .clone()
            .merged_over(&self.host.application_options());
        let mut app = Application::new(options, surface)?;
        app.apply_defaults(&manifest.rendering.defaults)?;
        surface.mount(app.view())?;

        self.renderer = Some(shared(app));
        self.state = RunnerState::RendererReady;
        log::debug!("renderer ready");
        Ok(())
    }

    /// Assemble the capabilities the project script can use.
    pub fn build_namespace(&mut self) -> Result<()> {
        self.require("build the namespace", &[RunnerState::RendererReady])?;
        let Some(app) = self.renderer.clone() else {
            return Err(RuntimeError::Lifecycle {
                operation: "build the namespace",
                state: self.state,
            });
        };

        let namespace = engine_namespace(app, self.loader.clone()).build()?;
        log::debug!("namespace: {}", namespace.names().collect::<Vec<_>>().join(", "));
        self.namespace = Some(namespace);
        self.state = RunnerState::NamespaceBuilt;
        Ok(())
    }

    /// Execute the project's own script.
    pub fn run(&mut self) -> Result<Dynamic> {
        self.require("run the project script", &[RunnerState::NamespaceBuilt])?;
        let source = self.source.clone().unwrap_or_default();
        self.execute_script(&source)
    }

    /// Execute `source` with the namespace in scope.
    ///
    /// Only one script runs per runner. A script that fails to compile did
    /// nothing and may be replaced.
    pub fn execute_script(&mut self, source: &str) -> Result<Dynamic> {
        self.require("execute a script", &[RunnerState::NamespaceBuilt])?;
        let Some(namespace) = &self.namespace else {
            return Err(RuntimeError::Lifecycle {
                operation: "execute a script",
                state: self.state,
            });
        };
        if self.script.has_run() {
            return Err(RuntimeError::Lifecycle {
                operation: "execute a script after a failed one",
                state: self.state,
            });
        }

        let value = self.script.execute(source, namespace)?;
        self.state = RunnerState::Running;
        log::debug!("project script finished");
        Ok(value)
    }

    /// Run every ticker callback once with `delta` frames.
    pub fn tick(&mut self, delta: f64) -> Result<()> {
        self.require("tick", &[RunnerState::Running])?;
        let Some(app) = &self.renderer else {
            return Ok(());
        };
        let callbacks = app.borrow().ticker().callbacks();
        for callback in &callbacks {
            self.script.call(callback, delta)?;
        }
        Ok(())
    }

    /// The current frame, or `None` before the renderer exists.
    pub fn render(&self) -> Option<Vec<Vec<Cell>>> {
        self.renderer.as_ref().map(|app| app.borrow().render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::{LoadError, ScriptError};
    use crate::loaders::MemoryLoader;
    use crate::renderer::{DisplayObject, HeadlessSurface};
    use crate::renderer::defaults::ScaleMode;

    const MANIFEST: &str = r#"{
        "rendering": {
            "application": {"resizeTo": "none", "width": 20, "height": 10},
            "defaults": {"baseTexture": {"scaleMode": "nearest"}}
        }
    }"#;

    fn project(script: &str) -> Rc<dyn Loader> {
        Rc::new(
            MemoryLoader::new()
                .with("/game/config.json", MANIFEST)
                .with("/game/main.rhai", script),
        )
    }

    #[test]
    fn stages_advance_in_order() {
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project("42"));
        assert_eq!(runner.state(), RunnerState::Idle);

        runner.load_manifest().unwrap();
        assert_eq!(runner.state(), RunnerState::ManifestLoaded);
        runner.initialize_renderer(&mut surface).unwrap();
        assert_eq!(runner.state(), RunnerState::RendererReady);
        runner.build_namespace().unwrap();
        assert_eq!(runner.state(), RunnerState::NamespaceBuilt);
        let value = runner.run().unwrap();
        assert_eq!(runner.state(), RunnerState::Running);
        assert_eq!(value.as_int(), Ok(42));

        let app = runner.renderer().unwrap();
        let app = app.borrow();
        assert_eq!(app.view().width, 20);
        assert_eq!(app.defaults.base_texture.scale_mode, ScaleMode::Nearest);
        assert_eq!(surface.mounts, 1);
    }

    #[test]
    fn out_of_order_stages_are_rejected() {
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project("1"));

        let err = runner.initialize_renderer(&mut surface).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Lifecycle {
                state: RunnerState::Idle,
                ..
            }
        ));
        assert!(runner.build_namespace().is_err());
        assert!(runner.run().is_err());
        assert!(runner.tick(1.0).is_err());
        assert_eq!(runner.state(), RunnerState::Idle);

        runner.load_manifest().unwrap();
        assert!(runner.load_manifest().is_err());
        assert!(runner.build_namespace().is_err());
        assert_eq!(runner.state(), RunnerState::ManifestLoaded);
    }

    #[test]
    fn renderer_can_be_mounted_again() {
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project("1"));
        runner.load_manifest().unwrap();
        runner.initialize_renderer(&mut surface).unwrap();
        runner.initialize_renderer(&mut surface).unwrap();
        assert_eq!(surface.mounts, 2);
        assert_eq!(runner.state(), RunnerState::RendererReady);
    }

    #[test]
    fn missing_script_keeps_runner_idle() {
        let loader: Rc<dyn Loader> = Rc::new(MemoryLoader::new().with("/game/config.json", MANIFEST));
        let mut runner = Runner::new("/game", loader);

        let err = runner.load_manifest().unwrap_err();
        assert!(matches!(err, RuntimeError::ManifestLoad(LoadError::NotFound { .. })));
        assert_eq!(runner.state(), RunnerState::Idle);
        assert!(runner.manifest().is_none());
    }

    #[test]
    fn unknown_default_properties_fail_to_load() {
        let loader: Rc<dyn Loader> = Rc::new(
            MemoryLoader::new()
                .with("/game/config.json", r#"{"rendering": {"defaults": {"bitmapFont": {"size": 3}}}}"#)
                .with("/game/main.rhai", "1"),
        );
        let mut runner = Runner::new("/game", loader);
        assert!(matches!(runner.load_manifest(), Err(RuntimeError::ManifestLoad(_))));
        assert_eq!(runner.state(), RunnerState::Idle);
    }

    #[test]
    fn invalid_defaults_leave_renderer_uninitialized() {
        let loader: Rc<dyn Loader> = Rc::new(
            MemoryLoader::new()
                .with("/game/config.json", r#"{"rendering": {"defaults": {"bitmapFont": {"resolution": 9}}}}"#)
                .with("/game/main.rhai", "1"),
        );
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", loader);
        runner.load_manifest().unwrap();

        let err = runner.initialize_renderer(&mut surface).unwrap_err();
        assert!(matches!(err, RuntimeError::Configuration(_)));
        assert_eq!(runner.state(), RunnerState::ManifestLoaded);
        assert!(runner.renderer().is_none());
        assert_eq!(surface.mounts, 0);
    }

    #[test]
    fn failed_scripts_do_not_start_running() {
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project("return missing_thing;"));
        runner.load_manifest().unwrap();
        runner.initialize_renderer(&mut surface).unwrap();
        runner.build_namespace().unwrap();

        let err = runner.run().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Script(ScriptError::UnresolvedIdentifier(ref name)) if name == "missing_thing"
        ));
        assert_eq!(runner.state(), RunnerState::NamespaceBuilt);
        assert!(matches!(runner.run(), Err(RuntimeError::Lifecycle { .. })));
    }

    #[test]
    fn failed_scripts_cannot_be_retried() {
        let script = r#"
            renderer.ticker().add(|delta| delta);
            if renderer.ticker().len() < 2 { throw "half done"; }
        "#;
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project(script));
        runner.load_manifest().unwrap();
        runner.initialize_renderer(&mut surface).unwrap();
        runner.build_namespace().unwrap();

        assert!(matches!(runner.run(), Err(RuntimeError::Script(ScriptError::Runtime(_)))));
        let err = runner.run().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Lifecycle {
                state: RunnerState::NamespaceBuilt,
                ..
            }
        ));
        assert!(runner.execute_script("1").is_err());
        assert_eq!(runner.state(), RunnerState::NamespaceBuilt);
        assert_eq!(runner.renderer().unwrap().borrow().ticker().len(), 1);
    }

    #[test]
    fn scripts_that_fail_to_compile_can_be_replaced() {
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::new("/game", project("let = ;"));
        runner.load_manifest().unwrap();
        runner.initialize_renderer(&mut surface).unwrap();
        runner.build_namespace().unwrap();

        assert!(matches!(runner.run(), Err(RuntimeError::Script(ScriptError::Compile(_)))));
        assert_eq!(runner.execute_script("7").unwrap().as_int(), Ok(7));
        assert_eq!(runner.state(), RunnerState::Running);
    }

    #[test]
    fn namespace_holds_the_engine_capabilities() {
        let mut surface = HeadlessSurface::new(40, 20);
        let runner = Runner::load("/game", project("renderer.width()"), HostConfig::default(), &mut surface).unwrap();
        let names: Vec<_> = runner.namespace().unwrap().names().collect();
        for expected in [
            "Defaults",
            "Loader",
            "Path",
            "Sprite",
            "SpriteSheet",
            "Tileset",
            "TilesetDisplay",
            "renderer",
        ] {
            assert!(names.contains(&expected), "{expected} missing from {names:?}");
        }
    }

    #[test]
    fn ticks_run_callbacks_in_registration_order() {
        let script = r#"
            let tileset = Tileset.load(#{ texture: "tiles.png", tileSize: [16, 16], gridSize: [1, 1] });
            let tilemap = TilesetDisplay.create(tileset);
            renderer.stage().add_child(tilemap);
            renderer.ticker().add(|delta| tilemap.step(delta));
            renderer.ticker().add(|delta| tilemap.step(tilemap.time()));
        "#;
        let mut surface = HeadlessSurface::new(40, 20);
        let mut runner = Runner::load("/game", project(script), HostConfig::default(), &mut surface).unwrap();
        runner.tick(1.0).unwrap();
        runner.tick(1.0).unwrap();

        let app = runner.renderer().unwrap();
        let children = app.borrow().stage().children();
        let [DisplayObject::Tilemap(display)] = children.as_slice() else {
            panic!("expected one tilemap, got {children:?}");
        };
        // (0 + 1) * 2 = 2, then (2 + 1) * 2 = 6
        assert_eq!(display.borrow().time(), 6.0);
    }
}
