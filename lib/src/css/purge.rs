use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::StyleSheet;
use lightningcss::traits::ToCss;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use rustc_hash::FxHashSet;

use crate::error::{Result, Chainable};

/// Words in markup that could be a class name or id.
static EXTRACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w:/-]+").unwrap());

/// Class and id names referenced by a selector, escapes included.
static SELECTOR_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.#]((?:[\w-]|\\.)+)").unwrap()
});

/// Removes style rules whose selectors name classes or ids that appear
/// nowhere in the content.
#[derive(Debug, Default)]
pub struct Purger {
    used: FxHashSet<String>,
    safelist: Option<RegexSet>,
}

impl Purger {
    pub fn new<S: AsRef<str>>(safelist: &[S]) -> Result<Self> {
        let safelist = match safelist.is_empty() {
            true => None,
            false => Some(RegexSet::new(safelist.iter().map(|s| s.as_ref()))
                .map_err(|e| error!("invalid purge safelist pattern", e))?),
        };

        Ok(Purger { used: FxHashSet::default(), safelist })
    }

    /// Records every candidate name in `content`.
    pub fn scan(&mut self, content: &str) {
        for word in EXTRACT.find_iter(content) {
            let word = word.as_str();
            self.used.insert(word.to_string());
            if word.contains([':', '/']) {
                let parts = word.split([':', '/']).filter(|p| !p.is_empty());
                self.used.extend(parts.map(String::from));
            }
        }
    }

    pub fn scan_file(&mut self, path: &std::path::Path) -> Result<()> {
        let content = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read purge content",
            "path" => path.display(),
        })?;

        self.scan(&content);
        Ok(())
    }

    fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
            || self.safelist.as_ref().map_or(false, |set| set.is_match(name))
    }

    /// A selector survives when every class and id it requires is in use.
    fn keeps_selector(&self, selector: &str) -> bool {
        SELECTOR_NAMES.captures_iter(&required_part(selector))
            .map(|c| c[1].replace('\\', ""))
            .all(|name| self.is_used(&name))
    }

    /// Purges `sheet` in place and returns how many style rules were removed.
    pub fn purge(&self, sheet: &mut StyleSheet<'_, '_>) -> usize {
        self.purge_rules(&mut sheet.rules)
    }

    fn purge_rules(&self, rules: &mut CssRuleList<'_>) -> usize {
        let mut removed = 0;
        rules.0.retain_mut(|rule| match rule {
            CssRule::Style(style) => {
                let Ok(selectors) = style.selectors.to_css_string(PrinterOptions::default()) else {
                    return true;
                };

                let keep = split_selectors(&selectors).any(|s| self.keeps_selector(s));
                match keep {
                    true => removed += self.purge_rules(&mut style.rules),
                    false => removed += 1,
                }

                keep
            }
            CssRule::Media(media) => {
                removed += self.purge_rules(&mut media.rules);
                !media.rules.0.is_empty()
            }
            CssRule::Supports(supports) => {
                removed += self.purge_rules(&mut supports.rules);
                !supports.rules.0.is_empty()
            }
            _ => true,
        });

        removed
    }
}

/// Drops attribute selectors and `:not()` arguments. Neither requires a name
/// to appear in the content.
fn required_part(selector: &str) -> String {
    let mut required = String::with_capacity(selector.len());
    let mut rest = selector;
    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            let escaped: String = rest.chars().take(2).collect();
            rest = &rest[escaped.len()..];
            required.push_str(&escaped);
        } else if c == '[' {
            rest = skip_group(rest, '[', ']');
        } else if rest.starts_with(":not(") {
            rest = skip_group(&rest[":not".len()..], '(', ')');
        } else {
            required.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    required
}

/// `s` starts with `open`. Returns what follows the matching `close`,
/// skipping over quoted strings and escapes.
fn skip_group(s: &str, open: char, close: char) -> &str {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            _ if escaped => escaped = false,
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c == open => depth += 1,
            (None, c) if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &s[i + c.len_utf8()..];
                }
            }
            _ => {}
        }
    }

    ""
}

/// Splits a selector list on its top-level commas.
fn split_selectors(list: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = vec![];
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&list[start..]);
    parts.into_iter().map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purge(css: &str, html: &str, safelist: &[&str]) -> String {
        let mut purger = Purger::new(safelist).unwrap();
        purger.scan(html);

        let mut sheet = crate::css::parse(css, "app.css").unwrap();
        purger.purge(&mut sheet);
        sheet.to_css(PrinterOptions::default()).unwrap().code
    }

    #[test]
    fn unused_rules_are_removed() {
        let css = ".used { a: b } .unused { c: d } body { margin: 0 } #nav { e: f }";
        let out = purge(css, r#"<body><div id="nav" class="used other"></div></body>"#, &[]);
        assert!(out.contains(".used"));
        assert!(out.contains("body"));
        assert!(out.contains("#nav"));
        assert!(!out.contains(".unused"));
    }

    #[test]
    fn lists_keep_any_used_selector_and_media_empties_vanish() {
        let css = ".gone, .here { a: b } @media print { .gone { c: d } }";
        let out = purge(css, r#"<p class="here">"#, &[]);
        assert!(out.contains(".here"));
        assert!(!out.contains("@media"));
    }

    #[test]
    fn safelist_patterns_survive() {
        let css = ".modal-open { a: b } .tooltip-inner { c: d } .card { e: f }";
        let out = purge(css, "<p>nothing</p>", &["modal", "^tooltip"]);
        assert!(out.contains(".modal-open"));
        assert!(out.contains(".tooltip-inner"));
        assert!(!out.contains(".card"));
    }

    #[test]
    fn escaped_names() {
        let css = r".md\:flex { display: flex }";
        assert!(purge(css, r#"<div class="md:flex">"#, &[]).contains("flex"));
        assert!(!purge(css, r#"<div class="flex">"#, &[]).contains("md"));
    }

    #[test]
    fn negations_and_attributes_require_nothing() {
        let css = r#".btn:not(.disabled) { a: b } a[href$=".pdf"] { c: d } .x[data-k="]"] { e: f }"#;
        let out = purge(css, r#"<a class="btn x" href="/a">"#, &[]);
        assert!(out.contains(".btn:not(.disabled)"));
        assert!(out.contains(".pdf"));
        assert!(out.contains(".x[data-k"));

        assert_eq!(required_part(r".a:not(.b, :not(.c)).d"), ".a.d");
        assert_eq!(required_part(r".w-\[1px\]"), r".w-\[1px\]");
    }

    #[test]
    fn top_level_commas_only() {
        let parts: Vec<_> = split_selectors(".a:is(.b, .c), .d").collect();
        assert_eq!(parts, vec![".a:is(.b, .c)", ".d"]);
    }
}
