use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, Chainable};
use crate::format::{Format, Toml};
use crate::fileset::Selector;
use crate::lint::LintConfig;

pub const CONFIG_FILE: &str = "furnace.toml";

/// An asset group: what to read and where its output goes.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSpec {
    pub input: String,
    pub output: PathBuf,
}

impl PathSpec {
    pub fn new<O: Into<PathBuf>>(input: &str, output: O) -> Self {
        PathSpec { input: input.into(), output: output.into() }
    }

    pub fn selector(&self) -> Result<Selector> {
        Selector::new().include(&self.input)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// The build output root. Every output directory lives below it.
    pub dist: PathBuf,
    pub fonts: PathSpec,
    pub images: PathSpec,
    pub styles: PathSpec,
    pub lib_scripts: PathSpec,
    pub app_scripts: PathSpec,
    pub views: PathSpec,
    /// Directory holding `default.json` and the per-template data files.
    pub data: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            dist: "dist".into(),
            fonts: PathSpec::new("resources/fonts/**/*.{eot,ttf,woff,svg}", "dist/fonts"),
            images: PathSpec::new("resources/img/**/*.{png,gif,jpg,jpeg,svg}", "dist/img"),
            styles: PathSpec::new("resources/scss/main.scss", "dist/css"),
            lib_scripts: PathSpec::new("resources/js/lib/*.js", "dist/js"),
            app_scripts: PathSpec::new("resources/js/**/*.js", "dist/js"),
            views: PathSpec::new("resources/views/*.html", "dist/html"),
            data: "resources/views/data".into(),
        }
    }
}

impl Paths {
    pub fn outputs(&self) -> [(&'static str, &Path); 6] {
        [
            ("fonts", &self.fonts.output),
            ("images", &self.images.output),
            ("styles", &self.styles.output),
            ("lib_scripts", &self.lib_scripts.output),
            ("app_scripts", &self.app_scripts.output),
            ("views", &self.views.output),
        ]
    }

    /// Application scripts are every script the library group doesn't claim.
    pub fn app_script_selector(&self) -> Result<Selector> {
        Selector::new()
            .include(&self.app_scripts.input)?
            .exclude(&self.lib_scripts.input)
    }

    /// The inputs a rebuild reads, plus the data directory; these drive the
    /// watcher. Fonts are copied by full builds only.
    pub fn watched(&self) -> Result<Selector> {
        let data = format!("{}/*.json", self.data.display());
        Selector::new()
            .include(&self.images.input)?
            .include(&self.styles.input)?
            .include(&styles_partials(&self.styles.input))?
            .include(&self.lib_scripts.input)?
            .include(&self.app_scripts.input)?
            .include(&self.views.input)?
            .include(&data)
    }

    pub fn validate(&self) -> Result<()> {
        for (group, output) in self.outputs() {
            if output == self.dist || !output.starts_with(&self.dist) {
                return err! {
                    "output directories must live inside the build root",
                    "group" => group,
                    "output" => output.display(),
                    "build root" => self.dist.display(),
                };
            }
        }

        Ok(())
    }
}

/// The stylesheet entry pulls in partials next to it; watch all of them.
fn styles_partials(entry: &str) -> String {
    match entry.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/**/*.{{scss,sass,css}}"),
        None => "**/*.{scss,sass,css}".into(),
    }
}

/// Browser major versions used to decide which vendor prefixes to emit.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BrowserTargets {
    pub chrome: Option<u32>,
    pub edge: Option<u32>,
    pub firefox: Option<u32>,
    pub safari: Option<u32>,
    pub ios_saf: Option<u32>,
    pub samsung: Option<u32>,
    pub opera: Option<u32>,
    pub android: Option<u32>,
    pub ie: Option<u32>,
}

impl Default for BrowserTargets {
    fn default() -> Self {
        BrowserTargets {
            chrome: Some(95),
            edge: Some(95),
            firefox: Some(91),
            safari: Some(13),
            ios_saf: Some(13),
            samsung: Some(15),
            opera: Some(80),
            android: Some(95),
            ie: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub targets: BrowserTargets,
    /// Class-name patterns (regular expressions) that purging never removes.
    pub purge_safelist: Vec<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let safelist = ["popover", "tooltip", "modal", "fade", "show", "hide", "alert"];
        StyleConfig {
            targets: BrowserTargets::default(),
            purge_safelist: safelist.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lints {
    pub styles: LintConfig,
    pub scripts: LintConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: "127.0.0.1".into(), port: 3000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig { debounce_ms: 200 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub styles: StyleConfig,
    pub lint: Lints,
    pub server: ServerConfig,
    pub watch: WatchConfig,
}

impl Config {
    /// Reads `furnace.toml` under `root`, falling back to defaults when the
    /// file doesn't exist.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        let config: Config = match path.is_file() {
            true => Toml::read(path.as_path()).chain_with(|| error! {
                "failed to load configuration",
                "path" => path.display(),
            })?,
            false => Config::default(),
        };

        config.paths.validate()?;
        Ok(config)
    }
}
