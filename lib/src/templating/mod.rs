pub mod minijinja;

use std::fmt::Debug;
use std::path::Path;

use crate::error::Result;

/// Template data: the shallow merge of `default.json` and a page's own data.
pub type Context = serde_json::Map<String, serde_json::Value>;

pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Creates an engine that loads templates by name from `root`.
    fn init(root: &Path) -> Self::Engine;
}

pub trait Engine: Send + Sync + Debug {
    /// Renders the template `name`, relative to the engine's root.
    fn render(&self, name: &str, context: &Context) -> Result<String>;
}
