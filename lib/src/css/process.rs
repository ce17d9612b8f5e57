use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, StyleSheet};
use lightningcss::targets::Targets;
use parcel_sourcemap::SourceMap;

use crate::error::Result;
use crate::mode::BuildMode;

/// A printed stylesheet and, in production, its source map as JSON.
#[derive(Debug)]
pub struct Output {
    pub code: String,
    pub map: Option<String>,
}

/// The source the printed stylesheet maps back to.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

/// Prefixes `sheet` for `targets` and prints it. Production output is
/// minified and comes with a source map.
pub fn finish(
    mut sheet: StyleSheet<'_, '_>,
    targets: Targets,
    mode: BuildMode,
    origin: Origin<'_>,
) -> Result<Output> {
    sheet.minify(MinifyOptions { targets, ..MinifyOptions::default() })
        .map_err(|e| error!("failed to prefix stylesheet", e))?;

    let mut source_map = match mode.source_maps() {
        true => {
            let mut map = SourceMap::new("/");
            let index = map.add_source(origin.name);
            map.set_source_content(index as usize, origin.content)
                .map_err(|e| error!("failed to record stylesheet source", e))?;

            Some(map)
        }
        false => None,
    };

    let printed = sheet.to_css(PrinterOptions {
        minify: mode.minify(),
        source_map: source_map.as_mut(),
        targets,
        ..PrinterOptions::default()
    }).map_err(|e| error!("failed to print stylesheet", e))?;

    let map = match source_map {
        Some(mut map) => Some(map.to_json(None).map_err(|e| error!("failed to serialize css source map", e))?),
        None => None,
    };

    Ok(Output { code: printed.code, map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserTargets;

    const CSS: &str = ".box {\n  user-select: none;\n  color: #ff0000;\n}\n";
    const ORIGIN: Origin<'static> = Origin { name: "main.scss", content: CSS };

    fn run(mode: BuildMode, targets: &BrowserTargets) -> Output {
        let sheet = crate::css::parse(CSS, "main.scss").unwrap();
        finish(sheet, crate::css::targets(targets), mode, ORIGIN).unwrap()
    }

    #[test]
    fn development_prefixes_without_minifying() {
        let output = run(BuildMode::Development, &BrowserTargets::default());
        assert!(output.code.contains("-webkit-user-select"));
        assert!(output.code.contains('\n'));
        assert!(output.map.is_none());
    }

    #[test]
    fn production_minifies_with_map() {
        let output = run(BuildMode::Production, &BrowserTargets::default());
        assert!(output.code.starts_with(".box{"));
        assert!(!output.code.contains('\n'));

        let map: serde_json::Value = serde_json::from_str(&output.map.unwrap()).unwrap();
        assert_eq!(map["sources"][0], "main.scss");
        assert!(map["mappings"].as_str().is_some_and(|m| !m.is_empty()));
    }
}
