//! Declaration Pass (Pass 1) - Register all top-level names.
//!
//! Walks the unit once and binds every class, struct, function and external
//! function in the root scope. Nothing is resolved here: class parents,
//! field types and signatures are left for Pass 2, which is what lets any
//! declaration refer to one that appears later in the source.
//!
//! A second top-level declaration of a name is a duplicate and is not
//! registered.

use staple_core::{
    ClassEntry, FunctionEntry, FunctionTraits, NodeId, SemanticError, Span, StructEntry, Symbol,
};
use staple_parser::ast::{Item, Script};
use tracing::{debug, trace};

use crate::context::CompilationContext;

/// Counts of what Pass 1 registered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationOutput {
    pub classes: usize,
    pub structs: usize,
    pub functions: usize,
}

/// Pass 1: register top-level declarations.
pub struct DeclarationPass<'a> {
    ctx: &'a mut CompilationContext,
    output: DeclarationOutput,
}

impl<'a> DeclarationPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            output: DeclarationOutput::default(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, script: &Script<'_>) -> DeclarationOutput {
        for item in script.items {
            self.visit_item(item);
        }
        debug!(
            classes = self.output.classes,
            structs = self.output.structs,
            functions = self.output.functions,
            "declaration pass complete"
        );
        self.output
    }

    fn visit_item(&mut self, item: &Item<'_>) {
        match item {
            Item::Class(class) => {
                let entry = ClassEntry::script(class.name.name, class.name.span);
                if self.register(Symbol::Class(entry), class.name.name, class.name.span, class.id) {
                    self.output.classes += 1;
                }
            }
            Item::Struct(decl) => {
                let entry = StructEntry::new(decl.name.name, decl.name.span);
                if self.register(Symbol::Struct(entry), decl.name.name, decl.name.span, decl.id) {
                    self.output.structs += 1;
                }
            }
            Item::Function(function) => {
                let mut traits = FunctionTraits::empty();
                if function.is_extern {
                    traits |= FunctionTraits::EXTERNAL;
                }
                if function.variadic {
                    traits |= FunctionTraits::VARIADIC;
                }
                let entry = FunctionEntry::global(function.name.name, function.name.span, traits);
                if self.register(
                    Symbol::Function(entry),
                    function.name.name,
                    function.name.span,
                    function.id,
                ) {
                    self.output.functions += 1;
                }
            }
        }
    }

    fn register(&mut self, symbol: Symbol, name: &str, span: Span, node: NodeId) -> bool {
        let root = self.ctx.scopes.root();
        if let Some(existing) = self.ctx.scopes.lookup_local(root, name) {
            let original = self.ctx.symbols.get(existing).span().unwrap_or_default();
            self.ctx.report(SemanticError::duplicate(name, original, span));
            return false;
        }
        trace!(name, kind = symbol.kind_name(), "declare");
        let id = self.ctx.symbols.add(symbol);
        self.ctx.define(root, name, id, span);
        self.ctx.bindings.bind_symbol(node, id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use staple_parser::Parser;

    fn declare(source: &str) -> (CompilationContext, DeclarationOutput) {
        let arena = Bump::new();
        let script = Parser::parse(source, &arena).unwrap();
        let mut ctx = CompilationContext::new();
        let output = DeclarationPass::new(&mut ctx).run(&script);
        (ctx, output)
    }

    #[test]
    fn registers_top_level_names() {
        let (ctx, output) = declare(
            r#"
            extern int printf(int8* format, ...);
            struct Point { int x; int y; }
            class Shape { int sides; }
            int main() { return 0; }
            "#,
        );
        assert_eq!(
            output,
            DeclarationOutput {
                classes: 1,
                structs: 1,
                functions: 2
            }
        );

        let root = ctx.scopes.root();
        let printf = ctx.scopes.lookup(root, "printf").unwrap();
        let entry = ctx.symbols.function(printf).unwrap();
        assert!(entry.is_external() && entry.is_variadic());
        assert!(!entry.signature_resolved);
        assert!(ctx.scopes.lookup(root, "Point").is_some());
        assert!(ctx.scopes.lookup(root, "Shape").is_some());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let (ctx, _) = declare(
            r#"
            class Shape { }
            int Shape() { return 0; }
            "#,
        );
        let errors = ctx.diagnostics.semantic_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], SemanticError::DuplicateDeclaration { name, .. } if name == "Shape"));

        let root = ctx.scopes.root();
        let shape = ctx.scopes.lookup(root, "Shape").unwrap();
        assert!(ctx.symbols.class(shape).is_some());
    }

    #[test]
    fn root_class_cannot_be_redeclared() {
        let (ctx, output) = declare("class Object { }");
        assert_eq!(output.classes, 0);
        assert_eq!(ctx.diagnostics.error_count(), 1);
    }
}
