//! The individual build steps. Each is a [`Task`](crate::task::Task).

mod clean;
mod fonts;
mod images;
mod styles;
mod scripts;
mod templates;

pub use clean::Clean;
pub use fonts::Fonts;
pub use images::{Compressor, ImageOptimizer, Images, JPEG_QUALITY};
pub use styles::Styles;
pub use scripts::{Scripts, LIBS};
pub use templates::{data_file, lookup_context, merge, Templates, DEFAULT_DATA};
