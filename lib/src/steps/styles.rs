use std::path::Path;

use crate::css::{self, process::Origin, Purger};
use crate::error::Result;
use crate::fileset::Selector;
use crate::lint::LintReport;
use crate::task::{Ctx, Task};
use crate::util;

#[cfg(feature = "sass")]
fn compile(path: &Path) -> Result<String> {
    use crate::format::{Grass, Mapper};

    Grass::default().map(path)
}

#[cfg(not(feature = "sass"))]
fn compile(path: &Path) -> Result<String> {
    util::read_to_string(path)
}

/// Compiles the Sass entry into a single stylesheet.
///
/// Compile errors are logged and leave the previous stylesheet in place. The
/// compiled CSS is linted, prefixed and, in production, purged against the
/// rendered pages and minified with a source map beside it.
#[derive(Debug, Default)]
pub struct Styles;

impl Styles {
    /// Every candidate class name in the rendered pages and view sources.
    fn purger(&self, ctx: &Ctx<'_>) -> Result<Purger> {
        let paths = &ctx.config.paths;
        let mut purger = Purger::new(&ctx.config.styles.purge_safelist)?;
        let content = Selector::new()
            .include(&format!("{}/**/*.html", paths.views.output.display()))?
            .include(&paths.views.input)?
            .collect(ctx.root)?;

        for entry in &content {
            purger.scan_file(&entry.path)?;
        }

        Ok(purger)
    }
}

impl Task for Styles {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let spec = &ctx.config.paths.styles;
        let entries = spec.selector()?.collect(ctx.root)?;
        let Some(first) = entries.first() else {
            tracing::warn!("no stylesheet matches '{}'", spec.input);
            return Ok(());
        };

        let mut compiled = Vec::with_capacity(entries.len());
        for entry in &entries {
            match compile(&entry.path) {
                Ok(css) => compiled.push(css),
                Err(e) => {
                    tracing::error!("{e}");
                    return Ok(());
                }
            }
        }

        let source = util::concat(&compiled);
        let origin = Origin { name: first.file_name(), content: &source };
        let mut report = LintReport::default();
        let mut sheet = match css::parse(&source, origin.name) {
            Ok(sheet) => sheet,
            Err(finding) => {
                report.push(finding);
                report.check("styles", &ctx.config.lint.styles)?;
                return err!("compiled stylesheet could not be parsed", "entry" => first.path.display());
            }
        };

        report.extend(css::lint(&mut sheet));
        report.check("styles", &ctx.config.lint.styles)?;

        if ctx.mode.is_production() {
            let removed = self.purger(ctx)?.purge(&mut sheet);
            tracing::debug!("purged {removed} unused rule(s)");
        }

        let targets = css::targets(&ctx.config.styles.targets);
        let output = css::finish(sheet, targets, ctx.mode, origin)?;

        let name = ctx.mode.stylesheet();
        let dir = ctx.path(&spec.output);
        let mut code = output.code;
        if let Some(map) = output.map {
            let map_name = format!("{name}.map");
            code.push_str(&format!("\n/*# sourceMappingURL={map_name} */\n"));
            util::write(dir.join(map_name), map)?;
        }

        util::write(dir.join(&name), code)
    }
}
