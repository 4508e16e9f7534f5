//! Inline JavaScript function sources
//!
//! A test-body constructor supplied as source text is re-emitted verbatim into
//! every generated test item. Its suspension style is read off the parsed
//! function instead of being declared by the caller.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{GenError, Result};

/// Whether generated steps run synchronously or are awaited in sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SuspensionStyle {
    #[default]
    Sync,
    Async,
}

impl SuspensionStyle {
    pub fn is_async(self) -> bool {
        self == Self::Async
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

/// JavaScript function source with its detected suspension style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFunction {
    source: String,
    style: SuspensionStyle,
}

impl InlineFunction {
    /// Parse `source` as a single function or arrow function expression.
    ///
    /// ```rust,ignore
    /// let body = InlineFunction::parse("async ({ exportName }) => async (browser) => {}")?;
    /// assert!(body.style().is_async());
    /// ```
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let style = detect_style(&source)?;
        Ok(Self { source, style })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn style(&self) -> SuspensionStyle {
        self.style
    }
}

fn detect_style(source: &str) -> Result<SuspensionStyle> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(GenError::invalid_test_body("source is empty"));
    }

    // Parenthesize so function declarations parse as expressions.
    let wrapped = format!("({trimmed});");
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &wrapped, SourceType::mjs()).parse();

    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(GenError::invalid_test_body(messages.join(", ")));
    }

    let body: &[Statement<'_>] = &ret.program.body;
    let [Statement::ExpressionStatement(stmt)] = body else {
        return Err(GenError::invalid_test_body(
            "expected exactly one function expression",
        ));
    };

    match stmt.expression.get_inner_expression() {
        Expression::FunctionExpression(func) if func.r#async => Ok(SuspensionStyle::Async),
        Expression::FunctionExpression(_) => Ok(SuspensionStyle::Sync),
        Expression::ArrowFunctionExpression(arrow) if arrow.r#async => Ok(SuspensionStyle::Async),
        Expression::ArrowFunctionExpression(_) => Ok(SuspensionStyle::Sync),
        _ => Err(GenError::invalid_test_body("expression is not a function")),
    }
}
