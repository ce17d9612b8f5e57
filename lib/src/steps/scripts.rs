use crate::error::Result;
use crate::fileset::Entry;
use crate::js;
use crate::lint::LintReport;
use crate::mode::BuildMode;
use crate::task::{self, Ctx, Task};
use crate::util;

pub const LIBS: &str = "libs.js";

/// Builds the two script bundles side by side: third-party libraries copied
/// verbatim into `libs.js`, and the application's own scripts, linted and
/// either concatenated or minified depending on the build mode.
#[derive(Debug, Default)]
pub struct Scripts;

fn read_all(entries: &[Entry]) -> Result<Vec<String>> {
    entries.iter().map(|e| util::read_to_string(&e.path)).collect()
}

impl Scripts {
    fn libraries(&self, ctx: &Ctx<'_>) -> Result<()> {
        let spec = &ctx.config.paths.lib_scripts;
        let entries = spec.selector()?.collect(ctx.root)?;
        if entries.is_empty() {
            tracing::debug!("no library scripts");
            return Ok(());
        }

        let sources = read_all(&entries)?;
        util::write(ctx.path(&spec.output).join(LIBS), util::concat(&sources))
    }

    fn application(&self, ctx: &Ctx<'_>) -> Result<()> {
        let paths = &ctx.config.paths;
        let entries = paths.app_script_selector()?.collect(ctx.root)?;
        if entries.is_empty() {
            tracing::debug!("no application scripts");
            return Ok(());
        }

        let sources = read_all(&entries)?;
        let mut report = LintReport::default();
        for (entry, source) in entries.iter().zip(&sources) {
            let relative = entry.path.strip_prefix(ctx.root).unwrap_or(&entry.path);
            report.extend(js::lint(source, relative));
        }

        report.check("scripts", &ctx.config.lint.scripts)?;

        let name = ctx.mode.script();
        let dir = ctx.path(&paths.app_scripts.output);
        let bundle = util::concat(&sources);
        if !ctx.mode.minify() {
            return util::write(dir.join(&name), bundle);
        }

        let minified = js::minify(&bundle, &BuildMode::Development.script())?;
        let map_name = format!("{name}.map");
        let code = format!("{}\n//# sourceMappingURL={map_name}\n", minified.code.trim_end());
        util::write(dir.join(&map_name), minified.map)?;
        util::write(dir.join(&name), code)
    }
}

impl Task for Scripts {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let (libraries, application) = rayon::join(
            || self.libraries(ctx),
            || self.application(ctx),
        );

        task::join(libraries, application)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::config::Config;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        dir
    }

    fn read(root: &Path, path: &str) -> String {
        fs::read_to_string(root.join(path)).unwrap()
    }

    #[test]
    fn development_concatenates() {
        let dir = project(&[
            ("resources/js/lib/b.js", "var b = 2;"),
            ("resources/js/lib/a.js", "var a = 1;"),
            ("resources/js/main.js", "function main() { return 1; }"),
            ("resources/js/widgets/menu.js", "function menu() { return 2; }"),
        ]);

        let config = Config::default();
        Scripts.run(&Ctx::new(dir.path(), &config, BuildMode::Development)).unwrap();

        assert_eq!(read(dir.path(), "dist/js/libs.js"), "var a = 1;\nvar b = 2;\n");
        let app = read(dir.path(), "dist/js/app.js");
        assert!(app.contains("function main") && app.contains("function menu"));
        assert!(!app.contains("var a"));
        assert!(!dir.path().join("dist/js/app.js.map").exists());
    }

    #[test]
    fn production_minifies_with_map() {
        let dir = project(&[("resources/js/main.js", "function main(argument) { return argument * 2; }\n")]);

        let config = Config::default();
        Scripts.run(&Ctx::new(dir.path(), &config, BuildMode::Production)).unwrap();

        let app = read(dir.path(), "dist/js/app.min.js");
        assert!(!app.contains("argument"));
        assert!(app.ends_with("//# sourceMappingURL=app.min.js.map\n"));
        assert!(dir.path().join("dist/js/app.min.js.map").is_file());
        assert!(!dir.path().join("dist/js/libs.js").exists());
        assert!(!dir.path().join("dist/js/app.js").exists());
    }

    #[test]
    fn lint_errors_over_threshold_abort() {
        let dir = project(&[
            ("resources/js/main.js", "debugger;\nalert('x');\n"),
            ("resources/js/lib/vendor.js", "debugger;"),
        ]);

        let mut config = Config::default();
        let error = Scripts.run(&Ctx::new(dir.path(), &config, BuildMode::Development)).unwrap_err();
        let failure = error.lint_failure().unwrap();
        assert_eq!(failure.report.error_count(), 1);
        assert_eq!(failure.report.warning_count(), 1);
        assert!(!dir.path().join("dist/js/app.js").exists());

        // The library bundle is independent of the application lint.
        assert!(dir.path().join("dist/js/libs.js").exists());

        config.lint.scripts.max_errors = 1;
        Scripts.run(&Ctx::new(dir.path(), &config, BuildMode::Development)).unwrap();
        assert!(dir.path().join("dist/js/app.js").exists());
    }
}
