use lightningcss::rules::{CssRule, CssRuleList, Location};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::StyleSheet;
use lightningcss::traits::ToCss;

use crate::lint::{Finding, LintReport};

/// Lints a parsed stylesheet, fixing what can be fixed in place.
///
/// * `block-no-empty`: a rule with nothing inside it. Removed.
/// * `declaration-no-important`: a declaration using `!important`.
pub fn lint(sheet: &mut StyleSheet<'_, '_>) -> LintReport {
    let mut report = LintReport::default();
    check(&mut sheet.rules, &mut report);
    report
}

fn at(loc: &Location) -> String {
    format!("line {}", loc.line + 1)
}

fn empty_block(what: &str, loc: &Location) -> Finding {
    Finding::error("block-no-empty", format!("empty block in {what} at {}", at(loc))).fixed()
}

fn check(rules: &mut CssRuleList<'_>, report: &mut LintReport) {
    rules.0.retain_mut(|rule| match rule {
        CssRule::Style(style) => {
            check(&mut style.rules, report);
            let selector = style.selectors.to_css_string(PrinterOptions::default())
                .unwrap_or_default();

            for property in &style.declarations.important_declarations {
                report.push(Finding::warning("declaration-no-important", format!(
                    "unexpected !important on '{}' in '{selector}' at {}",
                    property.property_id().name(), at(&style.loc)
                )));
            }

            let empty = style.declarations.declarations.is_empty()
                && style.declarations.important_declarations.is_empty()
                && style.rules.0.is_empty();

            if empty {
                report.push(empty_block(&format!("'{selector}'"), &style.loc));
            }

            !empty
        }
        CssRule::Media(media) => {
            check(&mut media.rules, report);
            let empty = media.rules.0.is_empty();
            if empty {
                report.push(empty_block("@media", &media.loc));
            }

            !empty
        }
        CssRule::Supports(supports) => {
            check(&mut supports.rules, report);
            let empty = supports.rules.0.is_empty();
            if empty {
                report.push(empty_block("@supports", &supports.loc));
            }

            !empty
        }
        _ => true,
    });
}
