//! Static inspection of a module's default export

use oxc_ast::ast::{
    Declaration, Expression, ExportDefaultDeclarationKind, IdentifierReference,
    ModuleDeclaration, ObjectExpression, ObjectPropertyKind, Program, Statement,
    VariableDeclarationKind,
};
use oxc_ast_visit::Visit;

use crate::service::{DefaultExportShape, HookSet};

/// Determine what can be known about the default export without running it.
///
/// The default export is `Literal` when it is an object literal, either inline
/// or through a top-level `const`, with no spread and no computed keys on it or
/// on any of its namespace objects. A `const` read anywhere besides the export
/// itself may be mutated before export (`meta.parameters = ...`), so it is
/// `Opaque`, as is everything else.
pub fn default_export_shape(program: &Program<'_>, namespaces: &[String]) -> DefaultExportShape {
    let Some(target) = default_export_target(program) else {
        return DefaultExportShape::Absent;
    };

    let object = match target {
        DefaultTarget::Expression(expr) => match expr.get_inner_expression() {
            Expression::ObjectExpression(object) => Some(&**object),
            Expression::Identifier(ident) => const_object(program, ident.name.as_str()),
            _ => None,
        },
        DefaultTarget::Local(name) => const_object(program, &name),
        DefaultTarget::Declaration => None,
    };

    object
        .and_then(|object| hooks_of(object, namespaces))
        .map_or(DefaultExportShape::Opaque, DefaultExportShape::Literal)
}

enum DefaultTarget<'p, 'a> {
    Expression(&'p Expression<'a>),
    /// `export { local as default }`
    Local(String),
    /// A function or class declaration
    Declaration,
}

fn default_export_target<'p, 'a>(program: &'p Program<'a>) -> Option<DefaultTarget<'p, 'a>> {
    for stmt in program.body.iter() {
        match stmt.as_module_declaration() {
            Some(ModuleDeclaration::ExportDefaultDeclaration(decl)) => {
                return Some(match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(_)
                    | ExportDefaultDeclarationKind::ClassDeclaration(_)
                    | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                        DefaultTarget::Declaration
                    }
                    kind => match kind.as_expression() {
                        Some(expr) => DefaultTarget::Expression(expr),
                        None => DefaultTarget::Declaration,
                    },
                });
            }
            Some(ModuleDeclaration::ExportNamedDeclaration(named)) if named.source.is_none() => {
                let local = named
                    .specifiers
                    .iter()
                    .find(|spec| spec.exported.name().as_str() == "default");
                if let Some(spec) = local {
                    return Some(DefaultTarget::Local(spec.local.name().to_string()));
                }
            }
            Some(ModuleDeclaration::ExportNamedDeclaration(named)) => {
                // `export { default } from "./meta"`
                if named
                    .specifiers
                    .iter()
                    .any(|spec| spec.exported.name().as_str() == "default")
                {
                    return Some(DefaultTarget::Declaration);
                }
            }
            _ => {}
        }
    }
    None
}

/// Initializer of a top-level `const name = { ... }` referenced only by the export
fn const_object<'p, 'a>(program: &'p Program<'a>, name: &str) -> Option<&'p ObjectExpression<'a>> {
    let mut counter = ReferenceCounter { name, count: 0 };
    counter.visit_program(program);
    if counter.count > 1 {
        return None;
    }

    program.body.iter().find_map(|stmt| {
        let var = match stmt {
            Statement::VariableDeclaration(var) => var,
            Statement::ExportNamedDeclaration(named) => match &named.declaration {
                Some(Declaration::VariableDeclaration(var)) => var,
                _ => return None,
            },
            _ => return None,
        };
        if var.kind != VariableDeclarationKind::Const {
            return None;
        }

        var.declarations.iter().find_map(|declarator| {
            let bound = declarator
                .id
                .get_binding_identifiers()
                .iter()
                .any(|ident| ident.name.as_str() == name);
            if !bound {
                return None;
            }
            match declarator.init.as_ref()?.get_inner_expression() {
                Expression::ObjectExpression(object) => Some(&**object),
                _ => None,
            }
        })
    })
}

/// Counts value references to `name`, shadowed ones included
struct ReferenceCounter<'n> {
    name: &'n str,
    count: usize,
}

impl<'a> Visit<'a> for ReferenceCounter<'_> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if ident.name.as_str() == self.name {
            self.count += 1;
        }
    }
}

fn hooks_of(object: &ObjectExpression<'_>, namespaces: &[String]) -> Option<HookSet> {
    let mut hooks = HookSet::default();

    for property in &object.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            return None;
        };
        if property.computed {
            return None;
        }
        let key = property.key.static_name()?;

        if namespaces.iter().any(|ns| ns.as_str() == key.as_ref()) {
            let Expression::ObjectExpression(namespace) = property.value.get_inner_expression()
            else {
                return None;
            };
            for nested in &namespace.properties {
                let ObjectPropertyKind::ObjectProperty(nested) = nested else {
                    return None;
                };
                if nested.computed {
                    return None;
                }
                hooks.mark(nested.key.static_name()?.as_ref());
            }
        } else {
            hooks.mark(key.as_ref());
        }
    }

    Some(hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SourceDialect;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;

    fn shape(source: &str) -> DefaultExportShape {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceDialect::Ts.module_source_type()).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        let namespaces = vec!["parameters".to_string(), "test".to_string()];
        default_export_shape(&ret.program, &namespaces)
    }

    #[test]
    fn no_default_export_is_absent() {
        assert_eq!(shape("export const Primary = {};"), DefaultExportShape::Absent);
    }

    #[test]
    fn literal_object_reports_hooks() {
        let DefaultExportShape::Literal(hooks) = shape(
            "export default { title: 'Button', beforeEach() {}, parameters: { after: () => {}, layout: 'centered' } };",
        ) else {
            panic!("expected literal shape");
        };
        assert!(hooks.before_each);
        assert!(hooks.after);
        assert!(!hooks.before);
        assert!(!hooks.after_each);
    }

    #[test]
    fn const_binding_is_followed() {
        let source = "const meta = { test: { setup() {} } } satisfies Meta;\nexport default meta;";
        let DefaultExportShape::Literal(hooks) = shape(source) else {
            panic!("expected literal shape");
        };
        assert!(hooks.setup);
    }

    #[test]
    fn spread_or_dynamic_namespace_is_opaque() {
        assert_eq!(
            shape("export default { ...base, title: 'x' };"),
            DefaultExportShape::Opaque
        );
        assert_eq!(
            shape("export default { parameters: shared };"),
            DefaultExportShape::Opaque
        );
        assert_eq!(shape("export default makeMeta();"), DefaultExportShape::Opaque);
        assert_eq!(
            shape("let meta = {};\nexport default meta;"),
            DefaultExportShape::Opaque
        );
    }

    #[test]
    fn const_touched_before_export_is_opaque() {
        for source in [
            "const meta = { title: 'M' };\nmeta.parameters = { before() {}, beforeEach() {} };\nexport default meta;",
            "const meta = { title: 'M' };\nObject.assign(meta, hooks);\nexport default meta;",
            "const meta = {};\nregister(meta);\nexport { meta as default };",
        ] {
            assert_eq!(shape(source), DefaultExportShape::Opaque, "{source}");
        }
    }

    #[test]
    fn specifier_default_is_followed() {
        let source = "const meta = { before() {} };\nexport { meta as default };";
        let DefaultExportShape::Literal(hooks) = shape(source) else {
            panic!("expected literal shape");
        };
        assert!(hooks.before);
    }
}
