use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::{Parser, ParserReturn};

use crate::error::Result;
use super::source_type;

#[derive(Debug)]
pub struct Minified {
    pub code: String,
    /// The source map as JSON.
    pub map: String,
}

/// Compresses and mangles `source`. `source_name` is the file the source map
/// points back to.
pub fn minify(source: &str, source_name: &str) -> Result<Minified> {
    let allocator = Allocator::default();
    let ParserReturn { mut program, errors, panicked, .. } =
        Parser::new(&allocator, source, source_type()).parse();

    if panicked || !errors.is_empty() {
        let messages = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>();
        return err!("failed to parse script for minification", messages.join("\n"));
    }

    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);
    let printed = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            source_map_path: Some(PathBuf::from(source_name)),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    let Some(map) = printed.map else {
        return err!("minifier produced no source map", "source" => source_name);
    };

    Ok(Minified { code: printed.code, map: map.to_json_string() })
}
