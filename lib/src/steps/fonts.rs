use std::fs;

use crate::error::{Result, Chainable};
use crate::task::{Ctx, Task};

/// Copies every font file into the font output directory, keeping each file's
/// path relative to the input glob's base.
#[derive(Debug, Default)]
pub struct Fonts;

impl Task for Fonts {
    fn name(&self) -> &'static str {
        "fonts"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let spec = &ctx.config.paths.fonts;
        let output = ctx.path(&spec.output);
        let entries = spec.selector()?.collect(ctx.root)?;
        for entry in &entries {
            let target = output.join(&entry.relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(&entry.path, &target).chain_with(|| error! {
                "failed to copy font",
                "from" => entry.path.display(),
                "to" => target.display(),
            })?;
        }

        tracing::debug!("copied {} font(s)", entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mode::BuildMode;

    #[test]
    fn copies_with_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("resources/fonts/icons")).unwrap();
        fs::write(root.join("resources/fonts/body.woff"), b"woff").unwrap();
        fs::write(root.join("resources/fonts/icons/glyphs.svg"), b"<svg/>").unwrap();
        fs::write(root.join("resources/fonts/LICENSE"), b"ofl").unwrap();

        let config = Config::default();
        Fonts.run(&Ctx::new(root, &config, BuildMode::Production)).unwrap();

        assert_eq!(fs::read(root.join("dist/fonts/body.woff")).unwrap(), b"woff");
        assert!(root.join("dist/fonts/icons/glyphs.svg").is_file());
        assert!(!root.join("dist/fonts/LICENSE").exists());
    }

    #[test]
    fn empty_input_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        Fonts.run(&Ctx::new(dir.path(), &config, BuildMode::Development)).unwrap();
        assert!(!dir.path().join("dist/fonts").exists());
    }
}
