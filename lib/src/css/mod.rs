//! Stylesheet post-processing on top of `lightningcss`: linting, purging of
//! unused rules, prefixing and minification.

pub mod lint;
pub mod purge;
pub mod process;

use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::config::BrowserTargets;
use crate::lint::Finding;

pub use self::lint::lint;
pub use self::purge::Purger;
pub use self::process::{finish, Output};

/// Parses compiled CSS. A parse failure is reported as a `syntax` finding.
pub fn parse<'i>(css: &'i str, filename: &str) -> Result<StyleSheet<'i, 'static>, Finding> {
    let options = ParserOptions {
        filename: filename.to_string(),
        ..ParserOptions::default()
    };

    StyleSheet::parse(css, options)
        .map_err(|e| Finding::error("syntax", e.to_string()).in_file(filename))
}

/// Converts configured major versions into `lightningcss`'s packed
/// `major << 16 | minor << 8 | patch` representation.
pub fn targets(config: &BrowserTargets) -> Targets {
    let version = |major: Option<u32>| major.map(|v| v << 16);
    let browsers = Browsers {
        android: version(config.android),
        chrome: version(config.chrome),
        edge: version(config.edge),
        firefox: version(config.firefox),
        ie: version(config.ie),
        ios_saf: version(config.ios_saf),
        opera: version(config.opera),
        safari: version(config.safari),
        samsung: version(config.samsung),
    };

    Targets::from(browsers)
}
