use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{CallExpression, DebuggerStatement, Expression};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;

use crate::lint::{Finding, LintReport};
use super::{line_of, source_type};

/// Lints one script.
///
/// * `syntax`: the script fails to parse or violates an early error.
/// * `no-debugger`: a `debugger` statement.
/// * `no-eval`: a call to `eval`.
/// * `no-alert`: a call to `alert`, `confirm` or `prompt` (warning).
pub fn lint(source: &str, path: &Path) -> LintReport {
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        Parser::new(&allocator, source, source_type()).parse();

    let mut report = LintReport::default();
    for error in &errors {
        report.push(Finding::error("syntax", error.to_string()).in_file(path));
    }

    if panicked || !errors.is_empty() {
        return report;
    }

    let semantic = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(&program);

    for error in &semantic.errors {
        report.push(Finding::error("syntax", error.to_string()).in_file(path));
    }

    let mut rules = Rules { source, path, report };
    rules.visit_program(&program);
    rules.report
}

struct Rules<'s> {
    source: &'s str,
    path: &'s Path,
    report: LintReport,
}

impl Rules<'_> {
    fn push(&mut self, mut finding: Finding, offset: u32) {
        finding.message = format!("{} (line {})", finding.message, line_of(self.source, offset));
        self.report.push(finding.in_file(self.path));
    }
}

/// The name a call goes through: `f(..)` and `window.f(..)` both give `f`.
fn callee_name<'a>(callee: &'a Expression<'_>) -> Option<&'a str> {
    match callee {
        Expression::Identifier(ident) => Some(ident.name.as_str()),
        Expression::StaticMemberExpression(member) => match &member.object {
            Expression::Identifier(object) if object.name.as_str() == "window" => {
                Some(member.property.name.as_str())
            }
            _ => None,
        },
        _ => None,
    }
}

impl<'a> Visit<'a> for Rules<'_> {
    fn visit_debugger_statement(&mut self, it: &DebuggerStatement) {
        self.push(Finding::error("no-debugger", "unexpected 'debugger' statement"), it.span.start);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        match callee_name(&it.callee) {
            Some("eval") => {
                self.push(Finding::error("no-eval", "'eval' can be harmful"), it.span.start);
            }
            Some(name @ ("alert" | "confirm" | "prompt")) => {
                let message = format!("unexpected {name}");
                self.push(Finding::warning("no-alert", message), it.span.start);
            }
            _ => {}
        }

        walk::walk_call_expression(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::Severity;

    fn rules(source: &str) -> Vec<(&'static str, Severity)> {
        lint(source, Path::new("main.js")).findings
            .into_iter()
            .map(|f| (f.rule, f.severity))
            .collect()
    }

    #[test]
    fn clean_script() {
        assert!(rules("var x = 1; function f(a) { return a + x; }").is_empty());
    }

    #[test]
    fn flags_debugger_eval_and_alert() {
        let found = rules("function f() {\n  debugger;\n  eval('1');\n  window.alert('hi');\n}");
        assert_eq!(found, vec![
            ("no-debugger", Severity::Error),
            ("no-eval", Severity::Error),
            ("no-alert", Severity::Warning),
        ]);

        let report = lint("\n\ndebugger;", Path::new("a.js"));
        assert!(report.findings[0].message.ends_with("(line 3)"));
        assert_eq!(report.findings[0].file.as_deref(), Some(Path::new("a.js")));
    }

    #[test]
    fn nested_calls_are_visited() {
        let found = rules("setTimeout(function () { alert(eval('x')); });");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn syntax_errors() {
        let found = rules("function (");
        assert!(!found.is_empty());
        assert!(found.iter().all(|(rule, severity)| *rule == "syntax" && *severity == Severity::Error));

        let found = rules("let a = 1; let a = 2;");
        assert_eq!(found, vec![("syntax", Severity::Error)]);
    }
}
