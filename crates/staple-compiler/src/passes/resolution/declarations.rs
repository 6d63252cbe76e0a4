//! Declaration sweep of Pass 2: inheritance, fields and signatures.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use staple_core::{
    FieldEntry, FunctionEntry, FunctionTraits, INIT_FUNCTION_NAME, SELF_NAME, ScopeId,
    SemanticError, Span, Symbol, SymbolId, Type, VariableEntry,
};
use staple_parser::ast::{ClassDecl, ClassMember, FieldDecl, FunctionDecl, Item, Script, StructDecl};
use staple_registry::ScopeKind;
use tracing::trace;

use super::ResolutionPass;
use crate::type_resolver::TypeResolver;

impl ResolutionPass<'_> {
    pub(super) fn declare_unit(&mut self, script: &Script<'_>) {
        // Parents first: field and member lookups below walk the chain.
        for class in script.classes() {
            self.bind_parent(class);
        }
        for decl in script.structs() {
            self.declare_struct(decl);
        }
        for class in script.classes() {
            self.declare_class_members(class);
        }
        let root = self.ctx.scopes.root();
        for function in script.functions() {
            let Some(symbol) = self.ctx.bindings.symbol(function.id) else {
                continue;
            };
            let scope = self.scope_for(function.id, root, ScopeKind::Function(symbol));
            self.resolve_signature(function, symbol, scope, None);
        }
        self.check_inline_containment(script);
        self.check_link_names(script);
    }

    /// A class or struct holding itself by value has no finite size.
    fn check_inline_containment(&mut self, script: &Script<'_>) {
        for item in script.items {
            let (node, name) = match item {
                Item::Class(class) => (class.id, &class.name),
                Item::Struct(decl) => (decl.id, &decl.name),
                Item::Function(_) => continue,
            };
            if let Some(id) = self.ctx.bindings.symbol(node)
                && self.ctx.symbols.contains_itself(id)
            {
                self.ctx.report(SemanticError::mismatch(
                    format!("'{}' contains itself by value", name.name),
                    name.span,
                ));
            }
        }
    }

    /// Generated names (`Shape_area`, `ShapeClass`, `ShapeClassObj`,
    /// `ShapeName`) live beside user names in the output. A clash is
    /// reported at the later declaration, in source order.
    fn check_link_names(&mut self, script: &Script<'_>) {
        let mut names = LinkNames::default();
        self.claim_class(&mut names, self.ctx.symbols.root_class(), Span::default());
        for item in script.items {
            match item {
                Item::Class(class) => {
                    if let Some(id) = self.ctx.bindings.symbol(class.id) {
                        self.claim_class(&mut names, id, class.name.span);
                    }
                }
                Item::Struct(decl) => names.record(decl.name.name, decl.name.span),
                Item::Function(function) => {
                    names.global(function.name.name, function.name.span);
                }
            }
        }
        for clash in names.clashes {
            self.ctx.report(clash);
        }
    }

    fn claim_class(&self, names: &mut LinkNames, class: SymbolId, span: Span) {
        let Some(entry) = self.ctx.symbols.class(class) else {
            return;
        };
        names.record(&entry.name, span);
        names.record(&entry.dispatch_record_name(), span);
        names.global(&entry.dispatch_instance_name(), span);
        names.global(&entry.name_global_name(), span);
        for function in &entry.functions {
            if let Some(f) = self.ctx.symbols.function(*function) {
                names.global(&f.link_name, f.span.unwrap_or(span));
            }
        }
    }

    /// Bind the `extends` clause of a class. Classes without a usable parent
    /// derive from the root class.
    fn bind_parent(&mut self, class: &ClassDecl<'_>) {
        let Some(id) = self.ctx.bindings.symbol(class.id) else {
            return;
        };
        let root_class = self.ctx.symbols.root_class();
        let parent = match class.extends {
            None => root_class,
            Some(ident) => {
                let root = self.ctx.scopes.root();
                match self.ctx.scopes.lookup(root, ident.name) {
                    None => {
                        self.ctx.report(SemanticError::unresolved(ident.name, ident.span));
                        root_class
                    }
                    Some(parent) if self.ctx.symbols.class(parent).is_none() => {
                        let kind = self.ctx.symbols.get(parent).kind_name();
                        let message = format!("'{}' is a {kind}, not a class", ident.name);
                        self.ctx.report(SemanticError::mismatch(message, ident.span));
                        root_class
                    }
                    Some(parent) if self.ctx.symbols.is_subclass_of(parent, id) => {
                        let message = format!(
                            "circular inheritance: '{}' cannot extend '{}'",
                            class.name.name, ident.name
                        );
                        self.ctx.report(SemanticError::mismatch(message, ident.span));
                        root_class
                    }
                    Some(parent) => parent,
                }
            }
        };
        trace!(class = class.name.name, parent = self.ctx.symbols.name(parent), "extends");
        self.ctx.symbols.set_parent(id, parent);
    }

    fn declare_struct(&mut self, decl: &StructDecl<'_>) {
        let Some(id) = self.ctx.bindings.symbol(decl.id) else {
            return;
        };
        let root = self.ctx.scopes.root();
        for field in decl.fields {
            let ty = TypeResolver::new(self.ctx, root).resolve_storage(&field.ty, "field");
            if let Some(existing) = self.ctx.symbols.struct_field(id, field.name.name) {
                let original = self.ctx.symbols.get(existing).span().unwrap_or_default();
                self.ctx.report(SemanticError::duplicate(
                    field.name.name,
                    original,
                    field.name.span,
                ));
                continue;
            }
            let symbol = self.add_field(field, ty, id);
            self.ctx.symbols.push_field(id, symbol);
        }
    }

    fn declare_class_members(&mut self, class: &ClassDecl<'_>) {
        let Some(id) = self.ctx.bindings.symbol(class.id) else {
            return;
        };
        let root = self.ctx.scopes.root();
        let scope = self.scope_for(class.id, root, ScopeKind::Class(id));
        self.install_implicit_init(id, scope, class);

        for member in class.members {
            match member {
                ClassMember::Field(field) => {
                    let ty = TypeResolver::new(self.ctx, scope).resolve_storage(&field.ty, "field");
                    let symbol = self.add_field(field, ty, id);
                    if self.ctx.define(scope, field.name.name, symbol, field.name.span) {
                        self.ctx.symbols.push_field(id, symbol);
                    }
                }
                ClassMember::Method(method) => self.declare_method(method, id, scope, class),
            }
        }
    }

    fn add_field(&mut self, field: &FieldDecl<'_>, ty: Type, owner: SymbolId) -> SymbolId {
        let entry = FieldEntry::new(field.name.name, field.name.span, ty, owner);
        let symbol = self.ctx.symbols.add(Symbol::Field(entry));
        self.ctx.bindings.bind_symbol(field.id, symbol);
        symbol
    }

    /// Every class starts with a no-op `void init()`, so construction always
    /// has an entry point.
    fn install_implicit_init(&mut self, class: SymbolId, scope: ScopeId, decl: &ClassDecl<'_>) {
        let mut entry = FunctionEntry::member(
            INIT_FUNCTION_NAME,
            decl.name.name,
            class,
            None,
            FunctionTraits::IMPLICIT,
        );
        entry.return_type = Type::VOID;
        entry.signature_resolved = true;
        let init = self.ctx.symbols.add(Symbol::Function(entry));
        if self.ctx.define(scope, INIT_FUNCTION_NAME, init, decl.name.span) {
            self.ctx.symbols.push_function(class, init);
        }
    }

    fn declare_method(
        &mut self,
        method: &FunctionDecl<'_>,
        class: SymbolId,
        class_scope: ScopeId,
        decl: &ClassDecl<'_>,
    ) {
        let entry = FunctionEntry::member(
            method.name.name,
            decl.name.name,
            class,
            Some(method.name.span),
            FunctionTraits::empty(),
        );
        let symbol = self.ctx.symbols.add(Symbol::Function(entry));
        self.ctx.bindings.bind_symbol(method.id, symbol);
        let scope = self.scope_for(method.id, class_scope, ScopeKind::Function(symbol));
        self.resolve_signature(method, symbol, scope, Some(class));

        if method.name.name != INIT_FUNCTION_NAME {
            if self.ctx.define(class_scope, method.name.name, symbol, method.name.span) {
                self.ctx.symbols.push_function(class, symbol);
            }
            return;
        }

        // A user `void init()` takes over the implicit one's slot. Any other
        // `init` collides with it.
        let plain = method.return_type.is_void() && method.params.is_empty();
        let existing = self.ctx.scopes.lookup_local(class_scope, INIT_FUNCTION_NAME);
        match existing {
            Some(implicit)
                if plain
                    && self
                        .ctx
                        .symbols
                        .function(implicit)
                        .is_some_and(|f| f.is_implicit()) =>
            {
                self.ctx.scopes.rebind(class_scope, INIT_FUNCTION_NAME, symbol);
                self.ctx.symbols.replace_function(class, implicit, symbol);
                trace!(class = decl.name.name, "user init replaces implicit init");
            }
            existing => {
                let original = existing
                    .and_then(|e| self.ctx.symbols.get(e).span())
                    .unwrap_or(decl.name.span);
                self.ctx.report(SemanticError::duplicate(
                    INIT_FUNCTION_NAME,
                    original,
                    method.name.span,
                ));
            }
        }
    }

    /// Resolve a function's return type and arguments and bind them in its
    /// parameter scope. Member functions also bind `self`.
    pub(super) fn resolve_signature(
        &mut self,
        function: &FunctionDecl<'_>,
        symbol: SymbolId,
        scope: ScopeId,
        owner: Option<SymbolId>,
    ) {
        let return_type = TypeResolver::new(self.ctx, scope).resolve(&function.return_type);

        if let Some(owner) = owner {
            let self_type = Type::pointer_to(Type::Class(owner));
            let entry = VariableEntry::new(SELF_NAME, function.name.span, self_type);
            let receiver = self.ctx.symbols.add(Symbol::Argument(entry));
            self.ctx.define(scope, SELF_NAME, receiver, function.name.span);
        }

        let mut arguments = Vec::with_capacity(function.params.len() + 1);
        for param in function.params {
            let ty = TypeResolver::new(self.ctx, scope).resolve_storage(&param.ty, "parameter");
            let entry = VariableEntry::new(param.name.name, param.name.span, ty);
            let argument = self.ctx.symbols.add(Symbol::Argument(entry));
            self.ctx.bindings.bind_symbol(param.id, argument);
            self.ctx.define(scope, param.name.name, argument, param.name.span);
            arguments.push(argument);
        }
        if function.variadic {
            arguments.push(self.ctx.symbols.add(Symbol::MultiArgumentMarker));
        }

        trace!(
            function = function.name.name,
            arguments = arguments.len(),
            "signature"
        );
        if let Err(err) = self.ctx.symbols.set_signature(symbol, return_type, arguments) {
            self.ctx
                .report(SemanticError::mismatch(err.to_string(), function.name.span));
        }
    }
}

/// Names taken in the output, split the way LLVM and C split them: record
/// types in one namespace, functions and globals in the other.
#[derive(Default)]
struct LinkNames {
    records: FxHashMap<String, Span>,
    globals: FxHashMap<String, Span>,
    clashes: Vec<SemanticError>,
}

impl LinkNames {
    fn record(&mut self, name: &str, span: Span) {
        Self::claim(&mut self.records, &mut self.clashes, name, span);
    }

    fn global(&mut self, name: &str, span: Span) {
        Self::claim(&mut self.globals, &mut self.clashes, name, span);
    }

    fn claim(
        taken: &mut FxHashMap<String, Span>,
        clashes: &mut Vec<SemanticError>,
        name: &str,
        span: Span,
    ) {
        match taken.entry(name.to_string()) {
            Entry::Occupied(first) => {
                clashes.push(SemanticError::duplicate(name, *first.get(), span));
            }
            Entry::Vacant(slot) => {
                slot.insert(span);
            }
        }
    }
}
