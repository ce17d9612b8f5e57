#![doc = svgbobdoc::transform!(
//! The build pipeline behind a static site's assets.
//!
//! # Overview
//!
//! Kiln turns a `resources/` tree of Sass, scripts, images, fonts and HTML
//! templates into a publishable `dist/` tree. Each transformation is a
//! [`Task`](task::Task); tasks are composed in series or in parallel and share
//! nothing but an immutable [`Ctx`](task::Ctx) carrying the project root, the
//! configuration and the [`BuildMode`](mode::BuildMode).
//!
//! A full build runs as follows:
//!
//! ```svgbob
//!  +-------+    +--------+    +-------+      +----------+
//!  | clean +--->| images +--->| fonts +--+-->|  styles  |
//!  +-------+    +--------+    +-------+  |   +----------+
//!                                        |   +----------+
//!                                        +-->| scripts  |
//!                                        |   +----------+
//!                                        |   +-----------+
//!                                        +-->| templates |
//!                                            +-----------+
//! ```
//!
//! While watching, a change to any input runs the rebuild sequence
//!
//! ```svgbob
//!  +--------+    +--------+    +---------+    +-----------+    +--------+
//!  | images +--->| styles +--->| scripts +--->| templates +--->| reload |
//!  +--------+    +--------+    +---------+    +-----------+    +--------+
//! ```
//!
//! with at most one rebuild running at a time; changes that arrive during a
//! rebuild schedule exactly one more.
//!
//! ## Modes
//!
//! Development builds write `app.css` and `app.js` unminified. Production
//! builds purge unused CSS, minify both bundles into `app.min.css` and
//! `app.min.js`, and write source maps beside them.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod mode;
pub mod config;
pub mod format;
pub mod fileset;
pub mod lint;
pub mod task;
pub mod css;
pub mod js;
pub mod templating;
pub mod steps;
pub mod pipeline;
pub mod watch;

pub use rayon;

pub use config::Config;
pub use error::{Error, Result};
pub use mode::BuildMode;
pub use pipeline::{Pipeline, Step};
pub use task::{Ctx, Task};
