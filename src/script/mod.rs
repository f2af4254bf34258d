//! Project script hosting.
//!
//! Scripts are Rhai. Each capability in the namespace is a read-only name
//! the script can use anywhere, inside its own functions and closures too.
//! Nothing else is visible besides the language's own built-ins.

pub mod api;
mod namespace;

use rhai::{AST, Dynamic, Engine, EvalAltResult, FnPtr, Scope};

pub use api::engine_namespace;
pub use namespace::{CapabilityNamespace, NamespaceBuilder};

use crate::error::ScriptError;

pub struct ScriptHost {
    engine: Engine,
    ast: Option<AST>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        engine.on_print(|text| log::info!(target: "script", "{text}"));
        engine.on_debug(|text, source, pos| {
            log::debug!(target: "script", "{}{pos:?}: {text}", source.unwrap_or(""))
        });
        api::register_api(&mut engine);
        Self { engine, ast: None }
    }

    /// Compile and run `source` with `namespace` in scope, returning the
    /// script's value (a top-level `return` value, else its last expression).
    pub fn execute(&mut self, source: &str, namespace: &CapabilityNamespace) -> Result<Dynamic, ScriptError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| ScriptError::Compile(e.to_string()))?;

        let mut scope = Scope::new();
        for (name, value) in namespace.iter() {
            scope.push_constant_dynamic(name.to_string(), value.clone());
        }
        // Script functions do not see the caller's scope, so capabilities
        // are also resolved here. Locals and parameters shadow them.
        let capabilities = namespace.clone();
        self.engine.on_var(move |name, _, context| {
            if context.scope().contains(name) {
                return Ok(None);
            }
            Ok(capabilities.get(name).cloned())
        });
        log::debug!("running script with {} capabilities", namespace.len());

        let result = self.engine.eval_ast_with_scope::<Dynamic>(&mut scope, &ast);
        // Closures created by the script stay callable even if it failed midway.
        self.ast = Some(ast);
        result.map_err(classify)
    }

    pub fn has_run(&self) -> bool {
        self.ast.is_some()
    }

    /// Invoke a script closure with `delta`.
    pub fn call(&self, callback: &FnPtr, delta: f64) -> Result<(), ScriptError> {
        let ast = self
            .ast
            .as_ref()
            .ok_or_else(|| ScriptError::Runtime("no script has run yet".to_string()))?;
        callback
            .call::<Dynamic>(&self.engine, ast, (delta,))
            .map(|_| ())
            .map_err(classify)
    }
}

fn classify(err: Box<EvalAltResult>) -> ScriptError {
    match *err {
        EvalAltResult::ErrorVariableNotFound(name, _) => ScriptError::UnresolvedIdentifier(name),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => classify(inner),
        other => ScriptError::Runtime(other.to_string()),
    }
}
