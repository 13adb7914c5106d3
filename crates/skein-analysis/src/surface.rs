//! Per-module surface extraction.
//!
//! Parses one TypeScript/JavaScript module and collects everything the rest
//! of the pipeline needs, so no AST outlives this module:
//!
//! - explicit imports (one per static import, re-export with source,
//!   `require()` call, `import()` expression, `import X = require()`),
//! - tunnel requests (one per named/default importer binding),
//! - the re-export facts the forwarding traversal consumes: top-level local
//!   names, importer bindings, forwarding declarations, and local
//!   definition facts.
//!
//! Edge-kind classification: a declaration is `type` when it is wholly
//! type-only or when it is a named-imports block whose every specifier is
//! type-only with no default binding; `import()` expressions and `require()`
//! calls inside a function body are `dynamic`; everything else is `runtime`.
//! Type-only specifiers inside a runtime import still tunnel as `type`.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, BindingPatternKind, CallExpression, Declaration, ExportDefaultDeclarationKind,
    Expression, FunctionBody, ImportDeclarationSpecifier, ImportExpression, ModuleExportName,
    Statement, TSModuleDeclarationName, TSModuleReference,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use skein_graph::EdgeKind;

/// Parse failures for a module.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// An explicit import edge request, prior to resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitImport {
    pub specifier: String,
    pub kind: EdgeKind,
}

/// A request to follow one imported name through its source module's
/// forwarding graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    pub specifier: String,
    pub export_name: String,
    pub kind: EdgeKind,
}

/// How an importer-local name is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportBindingKind {
    Default,
    Named,
    Namespace,
}

/// One importer-local binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub kind: ImportBindingKind,
    pub specifier: String,
    /// The imported name for named bindings.
    pub import_name: Option<String>,
}

/// A forwarding declaration in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ForwardDecl {
    /// `export * from 'm'`
    StarFrom { specifier: String },
    /// `export * as ns from 'm'`
    StarAsFrom { exported: String, specifier: String },
    /// `export { property as exported } from 'm'`
    NamedFrom {
        exported: String,
        property: String,
        specifier: String,
    },
    /// `export { local as exported }` without a module specifier
    NamedLocal { exported: String, local: String },
}

/// A forwarding step out of a module for one requested export name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardTarget {
    /// Follow the name into the specifier's module.
    Symbol {
        specifier: String,
        import_name: String,
    },
    /// The target is a module-level dependency (namespace forwarding).
    Module { specifier: String },
}

/// Everything the pipeline needs from one parsed module.
#[derive(Debug, Default)]
pub struct ModuleSurface {
    pub explicit_imports: Vec<ExplicitImport>,
    pub tunnel_requests: Vec<TunnelRequest>,
    pub local_names: FxHashSet<String>,
    pub import_bindings: FxHashMap<String, ImportBinding>,
    forwards: Vec<ForwardDecl>,
    exported_local_names: FxHashSet<String>,
    has_default_export: bool,
}

impl ModuleSurface {
    /// Does this module define `export_name` locally?
    ///
    /// For `default`: an `export =` assignment or a default export
    /// declaration. For any other name: an exported top-level declaration
    /// with that identifier, or an `export { local as name }` without a
    /// module specifier whose local side is a top-level name.
    pub fn defines_locally(&self, export_name: &str) -> bool {
        if export_name == "default" {
            return self.has_default_export;
        }
        if self.exported_local_names.contains(export_name) {
            return true;
        }
        self.forwards.iter().any(|fwd| {
            matches!(
                fwd,
                ForwardDecl::NamedLocal { exported, local }
                    if exported == export_name && self.local_names.contains(local)
            )
        })
    }

    /// Forwarding targets for `export_name`, in declaration order.
    pub fn forwarding_targets(&self, export_name: &str) -> Vec<ForwardTarget> {
        let mut targets = Vec::new();
        for fwd in &self.forwards {
            match fwd {
                ForwardDecl::StarFrom { specifier } => targets.push(ForwardTarget::Symbol {
                    specifier: specifier.clone(),
                    import_name: export_name.to_string(),
                }),
                ForwardDecl::StarAsFrom { exported, specifier } if exported == export_name => {
                    targets.push(ForwardTarget::Module {
                        specifier: specifier.clone(),
                    });
                }
                ForwardDecl::NamedFrom {
                    exported,
                    property,
                    specifier,
                } if exported == export_name => targets.push(ForwardTarget::Symbol {
                    specifier: specifier.clone(),
                    import_name: property.clone(),
                }),
                ForwardDecl::NamedLocal { exported, local } if exported == export_name => {
                    // Import-then-export: only when the local side is an
                    // imported binding, not a top-level declaration.
                    if self.local_names.contains(local) {
                        continue;
                    }
                    let Some(binding) = self.import_bindings.get(local) else {
                        continue;
                    };
                    match binding.kind {
                        ImportBindingKind::Namespace => targets.push(ForwardTarget::Module {
                            specifier: binding.specifier.clone(),
                        }),
                        ImportBindingKind::Default => targets.push(ForwardTarget::Symbol {
                            specifier: binding.specifier.clone(),
                            import_name: "default".to_string(),
                        }),
                        ImportBindingKind::Named => targets.push(ForwardTarget::Symbol {
                            specifier: binding.specifier.clone(),
                            import_name: binding
                                .import_name
                                .clone()
                                .unwrap_or_else(|| local.clone()),
                        }),
                    }
                }
                _ => {}
            }
        }
        targets
    }
}

fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

/// Parse a module and collect its surface.
pub fn collect_module_surface(source_text: &str, path: &Path) -> Result<ModuleSurface, SurfaceError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    let ret = Parser::new(&allocator, source_text, source_type).parse();
    if ret.panicked {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(SurfaceError::Parse {
            path: path.display().to_string(),
            message,
        });
    }

    let mut surface = ModuleSurface::default();

    for stmt in ret.program.body.iter() {
        match stmt {
            Statement::ImportDeclaration(import) => collect_import(import, &mut surface),
            Statement::ExportNamedDeclaration(named) => {
                if let Some(source) = &named.source {
                    // Re-export: explicit edge only, never a tunnel request.
                    let all_spec_type_only = !named.specifiers.is_empty()
                        && named.specifiers.iter().all(|s| s.export_kind.is_type());
                    let kind = if named.export_kind.is_type() || all_spec_type_only {
                        EdgeKind::Type
                    } else {
                        EdgeKind::Runtime
                    };
                    surface.explicit_imports.push(ExplicitImport {
                        specifier: source.value.to_string(),
                        kind,
                    });
                    for spec in &named.specifiers {
                        surface.forwards.push(ForwardDecl::NamedFrom {
                            exported: module_export_name(&spec.exported),
                            property: module_export_name(&spec.local),
                            specifier: source.value.to_string(),
                        });
                    }
                } else if let Some(decl) = &named.declaration {
                    for name in declared_names(decl) {
                        surface.local_names.insert(name.clone());
                        surface.exported_local_names.insert(name);
                    }
                } else {
                    for spec in &named.specifiers {
                        surface.forwards.push(ForwardDecl::NamedLocal {
                            exported: module_export_name(&spec.exported),
                            local: module_export_name(&spec.local),
                        });
                    }
                }
            }
            Statement::ExportAllDeclaration(all) => {
                let kind = if all.export_kind.is_type() {
                    EdgeKind::Type
                } else {
                    EdgeKind::Runtime
                };
                surface.explicit_imports.push(ExplicitImport {
                    specifier: all.source.value.to_string(),
                    kind,
                });
                match &all.exported {
                    Some(exported) => surface.forwards.push(ForwardDecl::StarAsFrom {
                        exported: module_export_name(exported),
                        specifier: all.source.value.to_string(),
                    }),
                    None => surface.forwards.push(ForwardDecl::StarFrom {
                        specifier: all.source.value.to_string(),
                    }),
                }
            }
            Statement::ExportDefaultDeclaration(def) => {
                surface.has_default_export = true;
                match &def.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        if let Some(id) = &func.id {
                            surface.local_names.insert(id.name.to_string());
                        }
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        if let Some(id) = &class.id {
                            surface.local_names.insert(id.name.to_string());
                        }
                    }
                    _ => {}
                }
            }
            Statement::TSExportAssignment(_) => {
                // `export = expr` is the default-export equivalent.
                surface.has_default_export = true;
            }
            Statement::TSImportEqualsDeclaration(ts_import) => {
                if let TSModuleReference::ExternalModuleReference(ext) =
                    &ts_import.module_reference
                {
                    surface.explicit_imports.push(ExplicitImport {
                        specifier: ext.expression.value.to_string(),
                        kind: EdgeKind::Runtime,
                    });
                    // The binding receives the whole module object.
                    surface.import_bindings.insert(
                        ts_import.id.name.to_string(),
                        ImportBinding {
                            kind: ImportBindingKind::Namespace,
                            specifier: ext.expression.value.to_string(),
                            import_name: None,
                        },
                    );
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    surface.local_names.insert(id.name.to_string());
                }
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    surface.local_names.insert(id.name.to_string());
                }
            }
            Statement::VariableDeclaration(var) => {
                for declarator in &var.declarations {
                    if let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind {
                        surface.local_names.insert(ident.name.to_string());
                    }
                }
            }
            Statement::TSTypeAliasDeclaration(alias) => {
                surface.local_names.insert(alias.id.name.to_string());
            }
            Statement::TSInterfaceDeclaration(iface) => {
                surface.local_names.insert(iface.id.name.to_string());
            }
            Statement::TSEnumDeclaration(ts_enum) => {
                surface.local_names.insert(ts_enum.id.name.to_string());
            }
            Statement::TSModuleDeclaration(module) => match &module.id {
                TSModuleDeclarationName::Identifier(ident) => {
                    surface.local_names.insert(ident.name.to_string());
                }
                TSModuleDeclarationName::StringLiteral(lit) => {
                    surface.local_names.insert(lit.value.to_string());
                }
            },
            _ => {}
        }
    }

    // Second pass for `import()` expressions and `require()` calls at any
    // nesting depth.
    let mut nested = NestedImportCollector::default();
    nested.visit_program(&ret.program);
    surface.explicit_imports.extend(nested.imports);

    Ok(surface)
}

fn collect_import(
    import: &oxc_ast::ast::ImportDeclaration<'_>,
    surface: &mut ModuleSurface,
) {
    let specifier = import.source.value.to_string();
    let clause_type_only = import.import_kind.is_type();

    let mut default_local: Option<String> = None;
    let mut has_namespace = false;
    // (imported, local, specifier-level type-only)
    let mut named: Vec<(String, String, bool)> = Vec::new();

    if let Some(specs) = &import.specifiers {
        for spec in specs {
            match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(default_spec) => {
                    default_local = Some(default_spec.local.name.to_string());
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns_spec) => {
                    has_namespace = true;
                    surface.import_bindings.insert(
                        ns_spec.local.name.to_string(),
                        ImportBinding {
                            kind: ImportBindingKind::Namespace,
                            specifier: specifier.clone(),
                            import_name: None,
                        },
                    );
                }
                ImportDeclarationSpecifier::ImportSpecifier(named_spec) => {
                    named.push((
                        module_export_name(&named_spec.imported),
                        named_spec.local.name.to_string(),
                        named_spec.import_kind.is_type(),
                    ));
                }
            }
        }
    }

    // A clause mixing a default binding and named imports cannot be wholly
    // type-only; individual type-only specifiers still tunnel as type.
    let all_named_type_only = !named.is_empty() && named.iter().all(|(_, _, t)| *t);
    let clause_kind = if clause_type_only
        || (all_named_type_only && default_local.is_none() && !has_namespace)
    {
        EdgeKind::Type
    } else {
        EdgeKind::Runtime
    };

    surface.explicit_imports.push(ExplicitImport {
        specifier: specifier.clone(),
        kind: clause_kind,
    });

    if let Some(local) = default_local {
        surface.tunnel_requests.push(TunnelRequest {
            specifier: specifier.clone(),
            export_name: "default".to_string(),
            kind: clause_kind,
        });
        surface.import_bindings.insert(
            local,
            ImportBinding {
                kind: ImportBindingKind::Default,
                specifier: specifier.clone(),
                import_name: None,
            },
        );
    }

    for (imported, local, spec_type_only) in named {
        let kind = if clause_kind == EdgeKind::Type || spec_type_only {
            EdgeKind::Type
        } else {
            clause_kind
        };
        surface.tunnel_requests.push(TunnelRequest {
            specifier: specifier.clone(),
            export_name: imported.clone(),
            kind,
        });
        surface.import_bindings.insert(
            local,
            ImportBinding {
                kind: ImportBindingKind::Named,
                specifier: specifier.clone(),
                import_name: Some(imported),
            },
        );
    }
    // Namespace imports never tunnel.
}

fn declared_names(decl: &Declaration<'_>) -> Vec<String> {
    let mut names = Vec::new();
    match decl {
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                if let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind {
                    names.push(ident.name.to_string());
                }
            }
        }
        Declaration::TSTypeAliasDeclaration(alias) => names.push(alias.id.name.to_string()),
        Declaration::TSInterfaceDeclaration(iface) => names.push(iface.id.name.to_string()),
        Declaration::TSEnumDeclaration(ts_enum) => names.push(ts_enum.id.name.to_string()),
        Declaration::TSModuleDeclaration(module) => match &module.id {
            TSModuleDeclarationName::Identifier(ident) => names.push(ident.name.to_string()),
            TSModuleDeclarationName::StringLiteral(lit) => names.push(lit.value.to_string()),
        },
        _ => {}
    }
    names
}

/// Visitor collecting `import()` expressions and `require()` calls.
///
/// `import()` is always dynamic; `require()` is dynamic inside a function
/// body and runtime at module scope.
#[derive(Default)]
struct NestedImportCollector {
    function_depth: u32,
    imports: Vec<ExplicitImport>,
}

impl<'a> Visit<'a> for NestedImportCollector {
    fn visit_function_body(&mut self, body: &FunctionBody<'a>) {
        self.function_depth += 1;
        walk::walk_function_body(self, body);
        self.function_depth -= 1;
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.imports.push(ExplicitImport {
                specifier: lit.value.to_string(),
                kind: EdgeKind::Dynamic,
            });
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name == "require" {
                if let Some(Argument::StringLiteral(lit)) = call.arguments.first() {
                    let kind = if self.function_depth > 0 {
                        EdgeKind::Dynamic
                    } else {
                        EdgeKind::Runtime
                    };
                    self.imports.push(ExplicitImport {
                        specifier: lit.value.to_string(),
                        kind,
                    });
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}
