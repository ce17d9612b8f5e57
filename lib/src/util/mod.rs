use std::fs;
use std::path::Path;

use crate::error::{Result, Chainable};

/// Writes `contents` to `path`, creating missing parent directories.
pub fn write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "directory" => parent.display(),
        })?;
    }

    fs::write(path, contents).chain_with(|| error! {
        "failed to write output file",
        "file path" => path.display(),
    })
}

/// Reads `path` as UTF-8 text.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).chain_with(|| error! {
        "failed to read file",
        "file path" => path.display(),
    })
}

/// Joins script sources the way a concatenating bundler does: each file on
/// its own line(s), separated by a newline.
pub fn concat<I, S>(sources: I) -> String
    where I: IntoIterator<Item = S>, S: AsRef<str>
{
    let mut output = String::new();
    for source in sources {
        let source = source.as_ref();
        output.push_str(source);
        if !source.ends_with('\n') {
            output.push('\n');
        }
    }

    output
}
