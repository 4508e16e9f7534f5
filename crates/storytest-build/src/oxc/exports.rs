//! Export catalog extraction

use oxc_ast::ast::{Declaration, ModuleDeclaration, Program};
use tracing::debug;

use crate::export::ExportName;

/// Collect the exported names of a parsed module, in source order.
///
/// Type-only exports (`export type`, interfaces, `declare` forms) are skipped.
/// `export * from "x"` contributes no names because they are only known after
/// resolving the target.
pub fn collect_exports(program: &Program<'_>) -> Vec<ExportName> {
    let mut exports = Vec::new();

    for stmt in program.body.iter() {
        let Some(module_decl) = stmt.as_module_declaration() else {
            continue;
        };

        match module_decl {
            ModuleDeclaration::ExportDefaultDeclaration(_) => {
                exports.push(ExportName::default_export());
            }
            ModuleDeclaration::ExportNamedDeclaration(named) => {
                if named.export_kind.is_type() {
                    continue;
                }
                if let Some(decl) = &named.declaration {
                    declaration_names(decl, &mut exports);
                }
                for spec in &named.specifiers {
                    if spec.export_kind.is_type() {
                        continue;
                    }
                    exports.push(ExportName::new(spec.exported.name().as_str()));
                }
            }
            ModuleDeclaration::ExportAllDeclaration(all) => {
                if all.export_kind.is_type() {
                    continue;
                }
                match &all.exported {
                    Some(exported) => exports.push(ExportName::new(exported.name().as_str())),
                    None => debug!(
                        source = %all.source.value,
                        "Skipping star re-export, names are not statically known"
                    ),
                }
            }
            _ => {}
        }
    }

    exports
}

/// Names bound by an exported declaration
fn declaration_names(decl: &Declaration<'_>, out: &mut Vec<ExportName>) {
    match decl {
        Declaration::VariableDeclaration(var) if !var.declare => {
            for declarator in &var.declarations {
                for ident in declarator.id.get_binding_identifiers() {
                    out.push(ExportName::new(ident.name.as_str()));
                }
            }
        }
        Declaration::FunctionDeclaration(func) if !func.declare => {
            if let Some(id) = &func.id {
                out.push(ExportName::new(id.name.as_str()));
            }
        }
        Declaration::ClassDeclaration(class) if !class.declare => {
            if let Some(id) = &class.id {
                out.push(ExportName::new(id.name.as_str()));
            }
        }
        Declaration::TSEnumDeclaration(decl) if !decl.declare => {
            out.push(ExportName::new(decl.id.name.as_str()));
        }
        _ => {}
    }
}
