//! Function symbol entry.

use bitflags::bitflags;

use crate::{Span, SymbolId, Type};

bitflags! {
    /// Properties of a function that affect resolution and lowering.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionTraits: u8 {
        /// Declared inside a class; receives a leading `self` at lowering time.
        const MEMBER = 1 << 0;
        /// Body supplied outside the compile unit.
        const EXTERNAL = 1 << 1;
        /// Accepts extra arguments after the declared ones.
        const VARIADIC = 1 << 2;
        /// Synthesized by the compiler (the implicit no-op `init`).
        const IMPLICIT = 1 << 3;
    }
}

/// A global, external or member function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub name: String,
    /// Symbol name used in generated code (`Class_method` for members).
    pub link_name: String,
    pub span: Option<Span>,
    pub return_type: Type,
    /// Argument symbols in declaration order. Never includes `self`.
    pub arguments: Vec<SymbolId>,
    pub traits: FunctionTraits,
    /// Declaring class of a member function.
    pub owner: Option<SymbolId>,
    /// Set once the signature has been resolved.
    pub signature_resolved: bool,
}

impl FunctionEntry {
    /// A free function whose signature is resolved later.
    pub fn global(name: impl Into<String>, span: Span, traits: FunctionTraits) -> Self {
        let name = name.into();
        Self {
            link_name: name.clone(),
            name,
            span: Some(span),
            return_type: Type::Error,
            arguments: Vec::new(),
            traits,
            owner: None,
            signature_resolved: false,
        }
    }

    /// A member function of `owner`, linked as `{class_name}_{name}`.
    pub fn member(
        name: impl Into<String>,
        class_name: &str,
        owner: SymbolId,
        span: Option<Span>,
        traits: FunctionTraits,
    ) -> Self {
        let name = name.into();
        Self {
            link_name: format!("{class_name}_{name}"),
            name,
            span,
            return_type: Type::Error,
            arguments: Vec::new(),
            traits: traits | FunctionTraits::MEMBER,
            owner: Some(owner),
            signature_resolved: false,
        }
    }

    pub fn is_member(&self) -> bool {
        self.traits.contains(FunctionTraits::MEMBER)
    }

    pub fn is_external(&self) -> bool {
        self.traits.contains(FunctionTraits::EXTERNAL)
    }

    pub fn is_variadic(&self) -> bool {
        self.traits.contains(FunctionTraits::VARIADIC)
    }

    pub fn is_implicit(&self) -> bool {
        self.traits.contains(FunctionTraits::IMPLICIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_functions_are_linked_through_their_class() {
        let f = FunctionEntry::member("area", "Shape", SymbolId::new(4), None, FunctionTraits::empty());
        assert_eq!(f.link_name, "Shape_area");
        assert!(f.is_member());
        assert!(!f.is_external());
    }

    #[test]
    fn signatures_start_unresolved() {
        let f = FunctionEntry::global("printf", Span::default(), FunctionTraits::EXTERNAL | FunctionTraits::VARIADIC);
        assert!(!f.signature_resolved);
        assert!(f.return_type.is_error());
        assert!(f.is_variadic());
    }
}
