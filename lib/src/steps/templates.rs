use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};
use crate::fileset::Glob;
use crate::format::{Format, Json};
use crate::task::{Ctx, Task};
use crate::templating::{Context, Engine, EngineInit};
use crate::templating::minijinja::MiniJinjaEngine;
use crate::util;

pub const DEFAULT_DATA: &str = "default.json";

/// Renders every view into `<stem>.html`, with `default.json` overlaid by
/// the view's own `<name>.json` as its context.
#[derive(Debug, Default)]
pub struct Templates;

/// Where the data for the view named `file_name` lives: `about.html` reads
/// `about.html.json`.
pub fn data_file(data_dir: &Path, file_name: &str) -> PathBuf {
    data_dir.join(format!("{file_name}.json"))
}

/// Reads a data file as a JSON object. Any failure to read or parse it gives
/// `None`.
pub fn lookup_context(path: &Path) -> Option<Context> {
    match Json::read::<_, Context>(path) {
        Ok(context) => Some(context),
        Err(e) => {
            tracing::debug!(path = %path.display(), "no page data: {e}");
            None
        }
    }
}

/// Overlays `page` onto `default`. Top-level keys in `page` win; nested
/// objects are replaced, not merged.
pub fn merge(mut default: Context, page: Context) -> Context {
    default.extend(page);
    default
}

impl Task for Templates {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let paths = &ctx.config.paths;
        let views = paths.views.selector()?.collect(ctx.root)?;
        if views.is_empty() {
            tracing::debug!("no templates match '{}'", paths.views.input);
            return Ok(());
        }

        let data_dir = ctx.path(&paths.data);
        let default_path = data_dir.join(DEFAULT_DATA);
        let default: Context = Json::read(default_path.as_path()).chain_with(|| error! {
            "the default template data is missing or invalid",
            "path" => default_path.display(),
        })?;

        let engine = MiniJinjaEngine::init(&ctx.path(Glob::new(&paths.views.input)?.base()));
        let output = ctx.path(&paths.views.output);
        for view in &views {
            let page = lookup_context(&data_file(&data_dir, view.file_name())).unwrap_or_default();
            let context = merge(default.clone(), page);
            let name = view.relative.to_string_lossy().replace('\\', "/");
            let html = engine.render(&name, &context).chain_with(|| error! {
                "failed to render template",
                "template" => view.path.display(),
            })?;

            let target = view.relative.with_file_name(format!("{}.html", view.file_stem()));
            util::write(output.join(target), html)?;
        }

        tracing::debug!("rendered {} template(s)", views.len());
        Ok(())
    }
}
