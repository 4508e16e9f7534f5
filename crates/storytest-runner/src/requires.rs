//! Discovery of `require` calls in compiled program text

use indexmap::IndexSet;
use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use std::path::Path;
use storytest_build::SourceDialect;

use crate::error::{Result, RunnerError};

/// Every literal specifier passed to `require(...)` in `code`, first occurrence
/// order, without duplicates.
///
/// Calls with a computed argument are skipped; the sandbox resolves those when
/// they are called.
pub fn collect_require_specifiers(code: &str, path: &Path) -> Result<Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceDialect::Js.script_source_type()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        return Err(RunnerError::Parse {
            path: path.to_path_buf(),
            messages: ret.errors.iter().map(ToString::to_string).collect(),
        });
    }

    let mut collector = RequireCollector::default();
    collector.visit_program(&ret.program);
    Ok(collector.specifiers.into_iter().collect())
}

#[derive(Default)]
struct RequireCollector {
    specifiers: IndexSet<String>,
}

impl RequireCollector {
    fn literal_argument(call: &CallExpression<'_>) -> Option<String> {
        let arguments: &[Argument<'_>] = &call.arguments;
        let [argument] = arguments else {
            return None;
        };
        match argument {
            Argument::StringLiteral(lit) => Some(lit.value.to_string()),
            Argument::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
                .quasis
                .first()
                .and_then(|quasi| quasi.value.cooked.as_ref())
                .map(ToString::to_string),
            _ => None,
        }
    }
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name.as_str() == "require" {
                if let Some(specifier) = Self::literal_argument(call) {
                    self.specifiers.insert(specifier);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}
