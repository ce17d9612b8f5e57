//! Script linting and minification on top of `oxc`.

pub mod lint;
pub mod minify;

use oxc_span::SourceType;

pub use self::lint::lint;
pub use self::minify::{minify, Minified};

/// Scripts are classic browser scripts, not modules.
pub(crate) fn source_type() -> SourceType {
    SourceType::cjs()
}

/// The 1-based line containing byte `offset` of `source`.
pub(crate) fn line_of(source: &str, offset: u32) -> usize {
    let end = (offset as usize).min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
