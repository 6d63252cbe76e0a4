//! IR generation: bound syntax tree to instruction stream.
//!
//! Runs only on a unit both semantic passes accepted, after class layouts
//! are final. The only failures left at this point are broken invariants,
//! reported as [`InternalError`]s.
//!
//! The generated unit is ordered:
//!
//! 1. string literal storage, one per distinct text
//! 2. struct records
//! 3. class records and dispatch records, root class first
//! 4. external function declarations
//! 5. function definitions, in source order
//!
//! ```ignore
//! let unit = CodeGenerator::new(&mut ctx).generate(&script)?;
//! print!("{}", render(&unit, &LlvmTemplate));
//! ```

mod collect;
mod expr;
mod function;
pub mod lower;
mod stmt;

use staple_core::{InternalError, NodeId, Span, SymbolId};
use staple_parser::ast::visitor::walk_script;
use staple_parser::ast::{FunctionDecl, Item, Script};
use tracing::debug;

use crate::context::CompilationContext;
use crate::ir::{
    ClassRecord, DispatchRecord, DispatchSlot, ExternalDecl, FunctionDef, Instruction,
    RecordField,
};
use collect::LiteralCollector;
use function::FunctionBuilder;
use lower::lower_type;

/// Lowers one compile unit.
pub struct CodeGenerator<'a> {
    ctx: &'a mut CompilationContext,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self { ctx }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, script: &Script<'_>) -> Result<Vec<Instruction>, InternalError> {
        self.hoist_literals(script);
        let ctx: &CompilationContext = self.ctx;

        let mut unit = Vec::new();
        for literal in ctx.symbols.string_literals() {
            if let Some(entry) = ctx.symbols.get(*literal).as_string_literal() {
                unit.push(Instruction::DeclareStringLiteral {
                    name: entry.global_name.clone(),
                    text: entry.text.clone(),
                });
            }
        }
        for decl in script.structs() {
            let symbol = bound(ctx, decl.id, decl.name.span)?;
            unit.push(Instruction::DeclareStruct {
                name: decl.name.name.to_string(),
                fields: struct_fields(ctx, symbol)?,
            });
        }

        unit.push(Instruction::DeclareClass(class_record(ctx, ctx.symbols.root_class())?));
        for class in script.classes() {
            let symbol = bound(ctx, class.id, class.name.span)?;
            unit.push(Instruction::DeclareClass(class_record(ctx, symbol)?));
        }

        unit.extend(external_declarations(ctx, script)?);

        let mut functions = 0;
        for item in script.items {
            match item {
                Item::Class(class) => {
                    let symbol = bound(ctx, class.id, class.name.span)?;
                    let methods: Vec<&FunctionDecl<'_>> = class.methods().collect();
                    let owned = ctx
                        .symbols
                        .class(symbol)
                        .map(|entry| entry.functions.clone())
                        .unwrap_or_default();
                    for function in owned {
                        // Implicit functions have no declaration and no body.
                        let body = methods
                            .iter()
                            .find(|m| ctx.bindings.symbol(m.id) == Some(function))
                            .and_then(|m| m.body);
                        let def = FunctionBuilder::new(ctx, function).build(function, body)?;
                        unit.push(Instruction::DeclareFunction(def));
                        functions += 1;
                    }
                }
                Item::Function(decl) if decl.body.is_some() => {
                    let function = bound(ctx, decl.id, decl.name.span)?;
                    let def: FunctionDef =
                        FunctionBuilder::new(ctx, function).build(function, decl.body)?;
                    unit.push(Instruction::DeclareFunction(def));
                    functions += 1;
                }
                Item::Function(_) | Item::Struct(_) => {}
            }
        }

        debug!(
            instructions = unit.len(),
            functions,
            literals = ctx.symbols.string_literals().len(),
            "code generation complete"
        );
        Ok(unit)
    }

    /// Intern every string literal before any body is lowered, so identical
    /// texts share one global.
    fn hoist_literals(&mut self, script: &Script<'_>) {
        let mut collector = LiteralCollector::default();
        walk_script(&mut collector, script);
        for (node, text) in collector.literals {
            let symbol = self.ctx.symbols.intern_string(text);
            self.ctx.bindings.bind_symbol(node, symbol);
        }
    }
}

fn bound(ctx: &CompilationContext, node: NodeId, span: Span) -> Result<SymbolId, InternalError> {
    ctx.bindings.symbol(node).ok_or(InternalError::UnboundNode {
        what: "declaration",
        span,
    })
}

fn record_fields(
    ctx: &CompilationContext,
    fields: &[SymbolId],
) -> Result<Vec<RecordField>, InternalError> {
    fields
        .iter()
        .map(|field| {
            Ok(RecordField {
                name: ctx.symbols.name(*field).to_string(),
                ty: lower_type(&ctx.symbols, &ctx.symbols.symbol_type(*field))?,
            })
        })
        .collect()
}

fn struct_fields(
    ctx: &CompilationContext,
    decl: SymbolId,
) -> Result<Vec<RecordField>, InternalError> {
    let fields = ctx
        .symbols
        .get(decl)
        .as_struct()
        .map(|entry| entry.fields.as_slice())
        .unwrap_or_default();
    record_fields(ctx, fields)
}

/// Instance and dispatch records of `class`, from its finalized layout.
fn class_record(ctx: &CompilationContext, class: SymbolId) -> Result<ClassRecord, InternalError> {
    let symbols = &ctx.symbols;
    let missing = || InternalError::MissingLayout {
        class: symbols.name(class).to_string(),
    };
    let entry = symbols.class(class).ok_or_else(missing)?;
    let layout = entry.layout.as_ref().ok_or_else(missing)?;
    let parent = entry.parent.and_then(|p| symbols.class(p));

    let slots = layout
        .dispatch
        .iter()
        .map(|function| {
            let (signature, _) = lower::signature(symbols, *function)?;
            let function = symbols
                .function(*function)
                .map(|f| f.link_name.clone())
                .unwrap_or_else(|| symbols.name(*function).to_string());
            Ok(DispatchSlot {
                function,
                signature,
            })
        })
        .collect::<Result<Vec<_>, InternalError>>()?;

    Ok(ClassRecord {
        name: entry.name.clone(),
        fields: record_fields(ctx, &layout.fields)?,
        dispatch: DispatchRecord {
            name: entry.dispatch_record_name(),
            instance: entry.dispatch_instance_name(),
            parent_instance: parent.map(|p| p.dispatch_instance_name()),
            parent_record: parent.map(|p| p.dispatch_record_name()),
            name_global: entry.name_global_name(),
            slots,
        },
        external: entry.external,
    })
}

/// Runtime-provided class functions, then `extern` declarations.
fn external_declarations(
    ctx: &CompilationContext,
    script: &Script<'_>,
) -> Result<Vec<Instruction>, InternalError> {
    let symbols = &ctx.symbols;
    let mut externals: Vec<SymbolId> = symbols
        .classes()
        .filter(|(_, class)| class.external)
        .flat_map(|(_, class)| class.functions.iter().copied())
        .collect();
    for decl in script.functions().filter(|f| f.is_extern) {
        externals.push(bound(ctx, decl.id, decl.name.span)?);
    }

    externals
        .into_iter()
        .map(|function| {
            let (signature, _) = lower::signature(symbols, function)?;
            let name = symbols
                .function(function)
                .map(|f| f.link_name.clone())
                .unwrap_or_else(|| symbols.name(function).to_string());
            Ok(Instruction::DeclareExternal(ExternalDecl { name, signature }))
        })
        .collect()
}
