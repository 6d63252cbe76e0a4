//! Lowering of resolved types and signatures to their IR form.

use staple_core::{InternalError, PrimitiveKind, SELF_NAME, Symbol, SymbolId, Type};
use staple_registry::SymbolTable;

use crate::ir::{IrType, Signature};

/// The IR storage type of `ty`.
///
/// Function and error types never reach code generation; meeting one means
/// resolution let something through.
pub fn lower_type(symbols: &SymbolTable, ty: &Type) -> Result<IrType, InternalError> {
    Ok(match ty {
        Type::Primitive(PrimitiveKind::Void) => IrType::Void,
        Type::Primitive(PrimitiveKind::Bool) => IrType::Bool,
        Type::Primitive(kind) => IrType::Int {
            bits: kind.bit_width(),
            signed: kind.is_signed(),
        },
        Type::Pointer(base) => IrType::pointer_to(lower_type(symbols, base)?),
        Type::Array(base, len) => IrType::Array(Box::new(lower_type(symbols, base)?), *len),
        Type::Class(id) | Type::Struct(id) => IrType::Record(symbols.name(*id).to_string()),
        Type::Function(id) => {
            return Err(InternalError::invariant(format!(
                "function '{}' used as a storage type",
                symbols.name(*id)
            )));
        }
        Type::Error => {
            return Err(InternalError::invariant(
                "unresolved type reached code generation",
            ));
        }
    })
}

/// Pointer to the instance record of `class`: the type of `self`.
pub fn receiver_type(symbols: &SymbolTable, class: SymbolId) -> IrType {
    IrType::pointer_to(IrType::Record(symbols.name(class).to_string()))
}

/// Declared arguments of `function`, without the variadic marker.
pub fn arguments(symbols: &SymbolTable, function: SymbolId) -> Vec<SymbolId> {
    symbols
        .function(function)
        .map(|entry| {
            entry
                .arguments
                .iter()
                .copied()
                .filter(|arg| !matches!(symbols.get(*arg), Symbol::MultiArgumentMarker))
                .collect()
        })
        .unwrap_or_default()
}

/// Signature and parameter names of `function`, receiver first for members.
pub fn signature(
    symbols: &SymbolTable,
    function: SymbolId,
) -> Result<(Signature, Vec<String>), InternalError> {
    let entry = symbols.function(function).ok_or_else(|| {
        InternalError::invariant(format!("'{}' is not a function", symbols.name(function)))
    })?;

    let mut params = Vec::with_capacity(entry.arguments.len() + 1);
    let mut names = Vec::with_capacity(entry.arguments.len() + 1);
    if let Some(owner) = entry.owner {
        params.push(receiver_type(symbols, owner));
        names.push(SELF_NAME.to_string());
    }
    for arg in arguments(symbols, function) {
        params.push(lower_type(symbols, &symbols.symbol_type(arg))?);
        names.push(symbols.name(arg).to_string());
    }

    let signature = Signature {
        return_type: lower_type(symbols, &entry.return_type)?,
        params,
        variadic: entry.is_variadic(),
    };
    Ok((signature, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use staple_core::{ClassEntry, Span};

    #[test]
    fn primitive_and_record_types() {
        let mut symbols = SymbolTable::new();
        let shape = symbols.add(Symbol::Class(ClassEntry::script("Shape", Span::default())));

        assert_eq!(lower_type(&symbols, &Type::BOOL).unwrap(), IrType::Bool);
        assert_eq!(
            lower_type(&symbols, &Type::UINT32).unwrap(),
            IrType::Int {
                bits: 32,
                signed: false
            }
        );
        assert_eq!(
            lower_type(&symbols, &Type::pointer_to(Type::Class(shape))).unwrap(),
            receiver_type(&symbols, shape)
        );
        assert!(lower_type(&symbols, &Type::Error).is_err());
    }

    #[test]
    fn member_signatures_lead_with_self() {
        let symbols = SymbolTable::new();
        let root = symbols.root_class();
        let init = symbols
            .own_member(root, "init")
            .expect("Object has init");

        let (signature, names) = signature(&symbols, init).unwrap();
        assert_eq!(names, vec!["self"]);
        assert_eq!(signature.params, vec![receiver_type(&symbols, root)]);
        assert!(signature.return_type.is_void());
    }
}
