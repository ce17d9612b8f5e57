//! File selection: brace-expanding globs, ordered include/exclude rules, and a
//! sorted walk of the matching files.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use glob::{MatchOptions, Pattern};
use rustc_hash::FxHashSet;

use crate::error::{Result, Chainable};

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A glob with `{a,b}` alternation, relative to a project root.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    base: PathBuf,
    patterns: Vec<Pattern>,
}

impl Glob {
    pub fn new(glob: &str) -> Result<Self> {
        let glob = glob.trim_start_matches("./");
        let patterns = expand_braces(glob).iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()
            .chain_with(|| error!("invalid glob pattern", "glob" => glob))?;

        Ok(Glob { source: glob.into(), base: literal_base(glob), patterns })
    }

    /// The longest leading directory without any glob syntax. Matched files
    /// keep their path relative to this directory when copied to an output.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches_path_with(path, MATCH))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Include,
    Exclude,
}

/// An ordered list of include/exclude globs. A path is selected when the last
/// rule matching it is an include.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    rules: Vec<(Rule, Glob)>,
}

#[derive(Debug, Clone)]
pub struct Entry {
    /// The full path, `root` joined with the project-relative path.
    pub path: PathBuf,
    /// The path relative to the base of the glob that selected it.
    pub relative: PathBuf,
    pub modified: Option<SystemTime>,
}

impl Entry {
    pub fn file_name(&self) -> &str {
        self.path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// File name without the extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((left, _)) => left,
            None => name,
        }
    }

    pub fn file_ext(&self) -> Option<&str> {
        self.file_name().rsplit_once('.').map(|(_, right)| right)
    }

    pub fn modified_after(&self, since: Option<SystemTime>) -> bool {
        match (since, self.modified) {
            (None, _) | (_, None) => true,
            (Some(since), Some(modified)) => modified > since,
        }
    }
}

impl Selector {
    pub fn new() -> Self {
        Selector::default()
    }

    pub fn include(mut self, glob: &str) -> Result<Self> {
        self.rules.push((Rule::Include, Glob::new(glob)?));
        Ok(self)
    }

    pub fn exclude(mut self, glob: &str) -> Result<Self> {
        self.rules.push((Rule::Exclude, Glob::new(glob)?));
        Ok(self)
    }

    /// The directories any selected file must live under, outermost only.
    pub fn bases(&self) -> Vec<&Path> {
        let mut bases: Vec<&Path> = self.rules.iter()
            .filter(|(rule, _)| *rule == Rule::Include)
            .map(|(_, glob)| glob.base())
            .collect();

        bases.sort();
        bases.dedup();
        let all = bases.clone();
        bases.retain(|base| !all.iter().any(|other| other != base && base.starts_with(other)));
        bases
    }

    /// `path` is relative to the project root.
    pub fn matches(&self, path: &Path) -> bool {
        self.selecting_rule(path).is_some()
    }

    fn selecting_rule(&self, path: &Path) -> Option<&Glob> {
        self.rules.iter()
            .rev()
            .find(|(_, glob)| glob.matches(path))
            .and_then(|(rule, glob)| (*rule == Rule::Include).then_some(glob))
    }

    /// Returns every selected file under `root`, sorted by path.
    pub fn collect<P: AsRef<Path>>(&self, root: P) -> Result<Vec<Entry>> {
        use jwalk::WalkDirGeneric;

        let root = root.as_ref();
        let mut seen = FxHashSet::default();
        let mut entries = vec![];
        for base in self.bases() {
            let dir = root.join(base);
            if !dir.is_dir() {
                continue;
            }

            let walker = WalkDirGeneric::<FsMetadata>::new(&dir)
                .sort(true)
                .follow_links(true)
                .parallelism(jwalk::Parallelism::Serial)
                .process_read_dir(|_, _, _, entries| {
                    entries.iter_mut()
                        .filter_map(|e| e.as_mut().ok())
                        .for_each(|e| e.client_state = FsMetadata(e.metadata().ok()))
                });

            for entry in walker {
                let entry = entry.map_err(|e| error! {
                    "failed to walk directory",
                    "directory" => dir.display(),
                    e,
                })?;

                let Some(metadata) = entry.client_state.0.as_ref() else { continue };
                if !metadata.is_file() {
                    continue;
                }

                let path = entry.path();
                let Ok(project_relative) = path.strip_prefix(root) else { continue };
                let Some(glob) = self.selecting_rule(project_relative) else { continue };
                if !seen.insert(project_relative.to_path_buf()) {
                    continue;
                }

                let relative = project_relative.strip_prefix(glob.base())
                    .unwrap_or(project_relative)
                    .to_path_buf();

                entries.push(Entry {
                    modified: metadata.modified().ok(),
                    relative,
                    path,
                });
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

#[derive(Default, Debug)]
struct FsMetadata(Option<fs::Metadata>);

impl jwalk::ClientState for FsMetadata {
    type ReadDirState = ();
    type DirEntryState = Self;
}

fn literal_base(glob: &str) -> PathBuf {
    let is_magic = |s: &str| s.contains(['*', '?', '[', '{']);
    let components: Vec<_> = Path::new(glob).components().collect();
    let literal = components.iter()
        .take_while(|c| !matches!(c, Component::Normal(s) if is_magic(&s.to_string_lossy())))
        .count();

    // A glob without magic names a single file: its base is its directory.
    let literal = match literal == components.len() {
        true => literal.saturating_sub(1),
        false => literal,
    };

    components[..literal].iter().collect()
}

/// Expands `{a,b}` alternations, including nested ones, into plain globs.
pub fn expand_braces(glob: &str) -> Vec<String> {
    let Some(open) = glob.find('{') else {
        return vec![glob.to_string()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = vec![];
    for (i, c) in glob[open..].char_indices().map(|(i, c)| (i + open, c)) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![glob.to_string()];
    };

    let (prefix, suffix) = (&glob[..open], &glob[close + 1..]);
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds.windows(2)
        .map(|w| &glob[w[0] + 1..w[1]])
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}
