use crate::error::Result;
use crate::steps::{Clean, Compressor, Fonts, ImageOptimizer, Images, Scripts, Styles, Templates};
use crate::task::{self, Ctx, FnTask, Task};

/// A single step, addressable by name from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Fonts,
    Images,
    Styles,
    Scripts,
    Templates,
}

/// Every build step, wired together in the order a build runs them.
///
/// A pipeline owns the image step's incremental state, so the same pipeline
/// should be reused for every rebuild in a process.
#[derive(Debug)]
pub struct Pipeline<C = ImageOptimizer> {
    clean: Clean,
    fonts: Fonts,
    images: Images<C>,
    styles: Styles,
    scripts: Scripts,
    templates: Templates,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::with_compressor(ImageOptimizer)
    }
}

impl<C: Compressor> Pipeline<C> {
    pub fn with_compressor(compressor: C) -> Self {
        Pipeline {
            clean: Clean,
            fonts: Fonts,
            images: Images::new(compressor),
            styles: Styles,
            scripts: Scripts,
            templates: Templates,
        }
    }

    pub fn images(&self) -> &Images<C> {
        &self.images
    }

    pub fn task(&self, step: Step) -> &dyn Task {
        match step {
            Step::Clean => &self.clean,
            Step::Fonts => &self.fonts,
            Step::Images => &self.images,
            Step::Styles => &self.styles,
            Step::Scripts => &self.scripts,
            Step::Templates => &self.templates,
        }
    }

    /// Runs a single step.
    pub fn run(&self, step: Step, ctx: &Ctx<'_>) -> Result<()> {
        task::run(self.task(step), ctx)
    }

    /// Clean, images, fonts, then styles, scripts and templates in parallel.
    pub fn build(&self, ctx: &Ctx<'_>) -> Result<()> {
        tracing::info!("building for {}", ctx.mode);
        let assets = FnTask::new("assets", |ctx| {
            task::parallel(&[&self.styles, &self.scripts, &self.templates], ctx)
        });

        task::series(&[&self.clean, &self.images, &self.fonts, &assets], ctx)
    }

    /// The watch loop's rebuild: images, styles, scripts, templates, strictly
    /// in that order. Nothing is cleaned; fonts are not recopied.
    pub fn rebuild(&self, ctx: &Ctx<'_>) -> Result<()> {
        task::series(&[&self.images, &self.styles, &self.scripts, &self.templates], ctx)
    }
}

#[cfg(test)]
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::Config;
    use crate::mode::BuildMode;

    #[test]
    fn single_steps_are_addressable() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.task(Step::Clean).name(), "clean");
        assert_eq!(pipeline.task(Step::Templates).name(), "templates");
    }

    #[test]
    fn rebuild_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("dist/fonts")).unwrap();
        fs::write(root.join("dist/fonts/a.woff"), b"x").unwrap();

        let config = Config::default();
        let pipeline = Pipeline::default();
        pipeline.rebuild(&Ctx::new(root, &config, BuildMode::Development)).unwrap();
        assert!(root.join("dist/fonts/a.woff").exists());

        pipeline.build(&Ctx::new(root, &config, BuildMode::Development)).unwrap();
        assert!(!root.join("dist/fonts/a.woff").exists());
    }
}
