//! Scope Tree - the lexical environments of a compile unit.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`Scope`] (the names bound directly in that region)
//! - Edges: parent → child, one incoming edge per non-root scope
//!
//! Lookup walks from a scope towards the root and returns the first binding
//! found, so inner declarations shadow outer ones.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use staple_core::{ScopeId, SymbolId};

use crate::RegistryError;

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The compile unit.
    Root,
    /// A class body; members of the class are bound here.
    Class(SymbolId),
    /// A function's parameter scope.
    Function(SymbolId),
    /// A `{ }` region inside a function.
    Block,
}

/// Names bound directly in one scope.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    names: FxHashMap<String, SymbolId>,
    /// Bound symbols in definition order.
    order: Vec<SymbolId>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            names: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// Symbols bound here, in the order they were defined.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }
}

/// Arena of scopes linked to their parents.
#[derive(Debug)]
pub struct ScopeTree {
    graph: DiGraph<Scope, ()>,
    root: NodeIndex,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the root scope.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(Scope::new(ScopeKind::Root));
        Self { graph, root }
    }

    pub fn root(&self) -> ScopeId {
        to_id(self.root)
    }

    /// Open a new scope nested in `parent`.
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let node = self.graph.add_node(Scope::new(kind));
        self.graph.add_edge(to_index(parent), node, ());
        to_id(node)
    }

    pub fn get(&self, scope: ScopeId) -> &Scope {
        &self.graph[to_index(scope)]
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.get(scope).kind
    }

    /// The enclosing scope, `None` for the root.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.graph
            .neighbors_directed(to_index(scope), Direction::Incoming)
            .next()
            .map(to_id)
    }

    /// `scope` and all its ancestors, innermost first.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |s| self.parent(*s))
    }

    /// Bind `name` in `scope`.
    ///
    /// Fails if `scope` itself already binds the name; bindings in enclosing
    /// scopes are shadowed, not rejected. The existing binding is kept.
    pub fn define(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: SymbolId,
    ) -> Result<(), RegistryError> {
        let data = &mut self.graph[to_index(scope)];
        if let Some(existing) = data.get(name) {
            return Err(RegistryError::AlreadyDefined {
                name: name.to_string(),
                existing,
            });
        }
        data.names.insert(name.to_string(), symbol);
        data.order.push(symbol);
        Ok(())
    }

    /// Replace the binding of `name` in `scope`, which must exist.
    pub fn rebind(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> Option<SymbolId> {
        let data = &mut self.graph[to_index(scope)];
        let slot = data.names.get_mut(name)?;
        let old = std::mem::replace(slot, symbol);
        if let Some(slot) = data.order.iter_mut().find(|s| **s == old) {
            *slot = symbol;
        }
        Some(old)
    }

    /// Look `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope).get(name)
    }

    /// Look `name` up from `scope` outwards; the innermost binding wins.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.chain(scope).find_map(|s| self.lookup_local(s, name))
    }

    /// The function whose body contains `scope`.
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<SymbolId> {
        self.chain(scope).find_map(|s| match self.kind(s) {
            ScopeKind::Function(f) => Some(f),
            _ => None,
        })
    }

    /// The class whose body contains `scope`.
    pub fn enclosing_class(&self, scope: ScopeId) -> Option<SymbolId> {
        self.chain(scope).find_map(|s| match self.kind(s) {
            ScopeKind::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

fn to_index(scope: ScopeId) -> NodeIndex {
    NodeIndex::new(scope.index())
}

fn to_id(node: NodeIndex) -> ScopeId {
    ScopeId::new(node.index() as u32)
}
