use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, Chainable};
use crate::task::{Ctx, Task};

/// Empties the build root. Markdown files directly inside it survive; those
/// nested deeper don't.
#[derive(Debug, Default)]
pub struct Clean;

fn preserved(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "md")
}

impl Task for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let dist = ctx.path(&ctx.config.paths.dist);
        let entries = match fs::read_dir(&dist) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).chain(error! {
                "failed to list build root",
                "directory" => dist.display(),
            }),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else if preserved(&path) {
                tracing::debug!(path = %path.display(), "keeping");
                continue;
            } else {
                fs::remove_file(&path)
            };

            match result {
                Ok(()) => tracing::debug!(path = %path.display(), "deleted"),
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => return Err(e).chain(error! {
                    "failed to delete previous output",
                    "path" => path.display(),
                }),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::Config;
    use crate::mode::BuildMode;

    fn touch(path: PathBuf) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn keeps_top_level_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root.join("dist/README.md"));
        touch(root.join("dist/css/app.css"));
        touch(root.join("dist/html/notes.md"));
        touch(root.join("dist/robots.txt"));

        let config = Config::default();
        Clean.run(&Ctx::new(root, &config, BuildMode::Development)).unwrap();

        let left: Vec<_> = fs::read_dir(root.join("dist")).unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(left, vec!["README.md"]);
    }

    #[test]
    fn idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let ctx = Ctx::new(dir.path(), &config, BuildMode::Development);

        // Absent build root.
        Clean.run(&ctx).unwrap();

        touch(dir.path().join("dist/js/app.js"));
        Clean.run(&ctx).unwrap();
        Clean.run(&ctx).unwrap();
        assert_eq!(fs::read_dir(dir.path().join("dist")).unwrap().count(), 0);
    }
}
