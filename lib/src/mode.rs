use std::fmt;

/// Whether a build targets development or production.
///
/// The mode is chosen once per invocation and handed to every step through
/// [`Ctx`](crate::task::Ctx); nothing mutates it while a build runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    #[inline]
    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }

    /// Production builds minify and purge; development builds never do.
    #[inline]
    pub fn minify(self) -> bool {
        self.is_production()
    }

    #[inline]
    pub fn source_maps(self) -> bool {
        self.is_production()
    }

    /// The file name of the bundled artifact `stem.ext` in this mode:
    /// `app.css` in development, `app.min.css` in production.
    pub fn artifact(self, stem: &str, ext: &str) -> String {
        match self {
            BuildMode::Development => format!("{stem}.{ext}"),
            BuildMode::Production => format!("{stem}.min.{ext}"),
        }
    }

    pub fn stylesheet(self) -> String {
        self.artifact("app", "css")
    }

    pub fn script(self) -> String {
        self.artifact("app", "js")
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => "development".fmt(f),
            BuildMode::Production => "production".fmt(f),
        }
    }
}
