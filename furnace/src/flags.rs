use std::path::PathBuf;

xflags::xflags! {
    /// Builds, watches and serves a static site's assets.
    cmd furnace {
        /// Project root. Defaults to the current directory.
        optional -C, --root root: PathBuf
        /// Log debug output.
        optional -v, --verbose
        /// Log errors only.
        optional -q, --quiet

        /// Same as `dev`, for when no command is given.
        default cmd dev-default {
            optional --port port: u16
            optional --host host: String
        }

        /// Build for development, serve `dist/` and rebuild on change.
        cmd dev {
            optional --port port: u16
            optional --host host: String
        }

        /// Build for production.
        cmd build {}

        /// Empty the build directory, keeping top-level markdown.
        cmd clean {}

        cmd styles {
            optional --prod
        }

        cmd scripts {
            optional --prod
        }

        cmd templates {
            optional --prod
        }

        cmd images {
            optional --prod
        }

        cmd fonts {
            optional --prod
        }
    }
}
