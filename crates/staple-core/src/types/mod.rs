//! The Staple type system.
//!
//! Types are a closed set:
//! - primitives with value semantics (`void`, `bool`, sized integers)
//! - pointers with reference semantics
//! - fixed-size arrays (string literal storage)
//! - function, class and struct types, which refer to their declaring symbol
//! - the reserved [`Type::Error`] produced by a failed resolution
//!
//! Class and struct types are nominal: two class types are equal iff they name
//! the same declared symbol.

mod primitive;

pub use primitive::PrimitiveKind;

use crate::SymbolId;

/// A resolved Staple type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Built-in scalar type.
    Primitive(PrimitiveKind),
    /// Pointer to a value of the base type.
    Pointer(Box<Type>),
    /// Fixed-size contiguous array.
    Array(Box<Type>, u32),
    /// Function type; the symbol holds the signature.
    Function(SymbolId),
    /// Class type; the symbol holds parent, fields and functions.
    Class(SymbolId),
    /// Plain aggregate type.
    Struct(SymbolId),
    /// Result of a failed resolution. Compatible with every type so one
    /// failure does not cascade into unrelated diagnostics.
    Error,
}

impl Type {
    pub const VOID: Type = Type::Primitive(PrimitiveKind::Void);
    pub const BOOL: Type = Type::Primitive(PrimitiveKind::Bool);
    pub const INT8: Type = Type::Primitive(PrimitiveKind::Int8);
    pub const INT32: Type = Type::Primitive(PrimitiveKind::Int32);
    pub const UINT32: Type = Type::Primitive(PrimitiveKind::UInt32);

    /// Wrap `base` in a pointer.
    #[inline]
    pub fn pointer_to(base: Type) -> Type {
        Type::Pointer(Box::new(base))
    }

    /// `void*`, the untyped pointer.
    #[inline]
    pub fn void_pointer() -> Type {
        Type::pointer_to(Type::VOID)
    }

    /// Storage type of a string literal with `len` bytes of text.
    ///
    /// One extra element holds the terminating NUL.
    #[inline]
    pub fn string_storage(len: usize) -> Type {
        Type::Array(Box::new(Type::INT8), len as u32 + 1)
    }

    /// The pointed-to type, if this is a pointer.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(base) => Some(base),
            _ => None,
        }
    }

    /// The primitive kind, if this is a primitive.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The class symbol this type names, looking through one pointer.
    ///
    /// Member access works on `Foo*` receivers, so callers resolving a member
    /// usually want the class behind the pointer.
    pub fn class_behind_pointer(&self) -> Option<SymbolId> {
        match self.pointee() {
            Some(Type::Class(id)) => Some(*id),
            _ => None,
        }
    }

    /// The class or struct stored inline in a value of this type. Arrays
    /// store their elements inline; pointers store nothing.
    pub fn inline_record(&self) -> Option<SymbolId> {
        match self {
            Type::Class(id) | Type::Struct(id) => Some(*id),
            Type::Array(base, _) => base.inline_record(),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Bool))
    }

    pub fn is_integer(&self) -> bool {
        self.primitive().is_some_and(PrimitiveKind::is_integer)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Whether a value of this type may be stored into a location of type `target`.
    ///
    /// Identical types are assignable. Pointers are assignable when their
    /// base types are, recursively. There is no implicit numeric promotion.
    /// [`Type::Error`] is assignable to and from everything.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Pointer(from), Type::Pointer(to)) => from.is_assignable_to(to),
            (from, to) => from == to,
        }
    }
}

impl From<PrimitiveKind> for Type {
    fn from(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_types_are_assignable() {
        assert!(Type::INT32.is_assignable_to(&Type::INT32));
        assert!(Type::Class(SymbolId::new(3)).is_assignable_to(&Type::Class(SymbolId::new(3))));
    }

    #[test]
    fn no_implicit_numeric_promotion() {
        let int64 = Type::Primitive(PrimitiveKind::Int64);
        assert!(!Type::INT32.is_assignable_to(&int64));
        assert!(!Type::BOOL.is_assignable_to(&Type::INT32));
    }

    #[test]
    fn classes_are_nominal() {
        let a = Type::Class(SymbolId::new(1));
        let b = Type::Class(SymbolId::new(2));
        assert!(!a.is_assignable_to(&b));
    }

    #[test]
    fn pointers_follow_their_bases() {
        let p = Type::pointer_to(Type::pointer_to(Type::INT32));
        let q = Type::pointer_to(Type::pointer_to(Type::INT32));
        let r = Type::pointer_to(Type::pointer_to(Type::BOOL));
        assert!(p.is_assignable_to(&q));
        assert!(!p.is_assignable_to(&r));
        assert!(!p.is_assignable_to(&Type::INT32));
    }

    #[test]
    fn error_is_compatible_with_everything() {
        assert!(Type::Error.is_assignable_to(&Type::BOOL));
        assert!(Type::void_pointer().is_assignable_to(&Type::Error));
        assert!(Type::pointer_to(Type::Error).is_assignable_to(&Type::pointer_to(Type::INT32)));
    }

    #[test]
    fn class_behind_pointer() {
        let class = SymbolId::new(9);
        assert_eq!(Type::pointer_to(Type::Class(class)).class_behind_pointer(), Some(class));
        assert_eq!(Type::Class(class).class_behind_pointer(), None);
    }

    #[test]
    fn string_storage_reserves_terminator() {
        assert_eq!(Type::string_storage(5), Type::Array(Box::new(Type::INT8), 6));
    }
}
