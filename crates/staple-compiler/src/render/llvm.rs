//! LLVM-style SSA text.
//!
//! Uses typed-pointer syntax. `bool` is `i1`, `void*` is `i8*`, class and
//! struct records are named types. Temporaries render as `%t.N` and labels
//! as `label.N`; `.` never appears in source identifiers, so neither can
//! collide with a named argument.

use std::fmt::Write;

use staple_parser::ast::{ArithmeticOp, CompareOp};

use super::Template;
use crate::ir::{
    ClassRecord, ExternalDecl, FunctionDef, Instruction, IrType, Label, Operand, RecordField,
    Signature,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LlvmTemplate;

impl LlvmTemplate {
    fn ty(&self, ty: &IrType) -> String {
        match ty {
            IrType::Void => "void".into(),
            IrType::Bool => "i1".into(),
            IrType::Int { bits, .. } => format!("i{bits}"),
            IrType::Pointer(base) if base.is_void() => "i8*".into(),
            IrType::Pointer(base) => format!("{}*", self.ty(base)),
            IrType::Array(base, len) => format!("[{len} x {}]", self.ty(base)),
            IrType::Record(name) => format!("%{name}"),
        }
    }

    fn value(&self, operand: &Operand) -> String {
        match operand {
            Operand::Const {
                value,
                ty: IrType::Bool,
            } => (*value != 0).to_string(),
            Operand::Const { value, .. } => value.to_string(),
            Operand::Temp { id, .. } => format!("%t.{id}"),
            Operand::Named { name, .. } => format!("%{name}"),
            Operand::Global { name, .. } => format!("@{name}"),
            Operand::Label(label) => self.label_ref(*label),
        }
    }

    fn typed(&self, operand: &Operand) -> String {
        format!("{} {}", self.ty(operand.ty()), self.value(operand))
    }

    fn label_name(&self, label: Label) -> String {
        format!("label.{}", label.0)
    }

    fn label_ref(&self, label: Label) -> String {
        format!("%{}", self.label_name(label))
    }

    fn params(&self, signature: &Signature) -> String {
        let mut params: Vec<String> = signature.params.iter().map(|p| self.ty(p)).collect();
        if signature.variadic {
            params.push("...".into());
        }
        params.join(", ")
    }

    /// Pointer-to-function type, e.g. `void (%Shape*)*`.
    fn function_pointer(&self, signature: &Signature) -> String {
        format!(
            "{} ({})*",
            self.ty(&signature.return_type),
            self.params(signature)
        )
    }

    fn record_body(&self, types: impl Iterator<Item = String>) -> String {
        let types: Vec<String> = types.collect();
        if types.is_empty() {
            "{}".into()
        } else {
            format!("{{ {} }}", types.join(", "))
        }
    }
}

/// `c"..."` body: printable ASCII verbatim, everything else as `\XX`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 3);
    for byte in text.bytes().chain(std::iter::once(0)) {
        if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
            out.push(byte as char);
        } else {
            let _ = write!(out, "\\{byte:02X}");
        }
    }
    out
}

impl Template for LlvmTemplate {
    fn string_literal(&self, name: &str, text: &str) -> String {
        format!(
            "@{name} = private unnamed_addr constant [{} x i8] c\"{}\"",
            text.len() + 1,
            escape(text)
        )
    }

    fn struct_decl(&self, name: &str, fields: &[RecordField]) -> String {
        let body = self.record_body(fields.iter().map(|f| self.ty(&f.ty)));
        format!("%{name} = type {body}")
    }

    fn class_decl(&self, class: &ClassRecord) -> String {
        let dispatch = &class.dispatch;
        let mut out = format!("\n; class {}\n", class.name);
        let fields = self.record_body(class.fields.iter().map(|f| self.ty(&f.ty)));
        let _ = writeln!(out, "%{} = type {fields}", class.name);
        let slots = self.record_body((0..dispatch.slots.len() + 2).map(|_| "i8*".to_string()));
        let _ = writeln!(out, "%{} = type {slots}", dispatch.name);

        if class.external {
            let _ = write!(out, "@{} = external global %{}", dispatch.instance, dispatch.name);
            return out;
        }

        let name_global = &dispatch.name_global;
        let name_len = class.name.len() + 1;
        let _ = writeln!(
            out,
            "@{name_global} = private unnamed_addr constant [{name_len} x i8] c\"{}\"",
            escape(&class.name)
        );

        let mut entries = vec![format!(
            "i8* getelementptr inbounds ([{name_len} x i8], [{name_len} x i8]* @{name_global}, i32 0, i32 0)"
        )];
        entries.push(match (&dispatch.parent_instance, &dispatch.parent_record) {
            (Some(instance), Some(record)) => {
                format!("i8* bitcast (%{record}* @{instance} to i8*)")
            }
            _ => "i8* null".into(),
        });
        for slot in &dispatch.slots {
            entries.push(format!(
                "i8* bitcast ({} @{} to i8*)",
                self.function_pointer(&slot.signature),
                slot.function
            ));
        }
        let _ = write!(
            out,
            "@{} = global %{} {{ {} }}",
            dispatch.instance,
            dispatch.name,
            entries.join(", ")
        );
        out
    }

    fn external(&self, decl: &ExternalDecl) -> String {
        format!(
            "declare {} @{}({})",
            self.ty(&decl.signature.return_type),
            decl.name,
            self.params(&decl.signature)
        )
    }

    fn function(&self, function: &FunctionDef, body: &[String]) -> String {
        let params: Vec<String> = function
            .params()
            .map(|(name, ty)| format!("{} %{name}", self.ty(ty)))
            .collect();
        let mut out = format!(
            "\ndefine {} @{}({}) {{\n",
            self.ty(&function.signature.return_type),
            function.name,
            params.join(", ")
        );
        for (instruction, line) in function.body.iter().zip(body) {
            if matches!(instruction, Instruction::Label(_)) {
                let _ = writeln!(out, "{line}");
            } else {
                let _ = writeln!(out, "  {line}");
            }
        }
        out.push('}');
        out
    }

    fn label(&self, label: Label) -> String {
        format!("{}:", self.label_name(label))
    }

    fn alloca(&self, dest: &Operand, ty: &IrType, count: u32) -> String {
        format!("{} = alloca {}, i32 {count}", self.value(dest), self.ty(ty))
    }

    fn load(&self, dest: &Operand, address: &Operand) -> String {
        format!(
            "{} = load {}, {}",
            self.value(dest),
            self.ty(dest.ty()),
            self.typed(address)
        )
    }

    fn store(&self, value: &Operand, address: &Operand) -> String {
        format!("store {}, {}", self.typed(value), self.typed(address))
    }

    fn get_element_ptr(&self, dest: &Operand, base: &Operand, indices: &[u32]) -> String {
        let element = base.ty().pointee().map(|t| self.ty(t)).unwrap_or_default();
        let indices: Vec<String> = indices.iter().map(|i| format!("i32 {i}")).collect();
        format!(
            "{} = getelementptr inbounds {element}, {}, {}",
            self.value(dest),
            self.typed(base),
            indices.join(", ")
        )
    }

    fn cast(&self, dest: &Operand, value: &Operand) -> String {
        format!(
            "{} = bitcast {} to {}",
            self.value(dest),
            self.typed(value),
            self.ty(dest.ty())
        )
    }

    fn arithmetic(
        &self,
        op: ArithmeticOp,
        dest: &Operand,
        left: &Operand,
        right: &Operand,
    ) -> String {
        let signed = left.ty().is_signed();
        let name = match op {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Mul => "mul",
            ArithmeticOp::Div if signed => "sdiv",
            ArithmeticOp::Div => "udiv",
            ArithmeticOp::BitAnd => "and",
            ArithmeticOp::BitOr => "or",
            ArithmeticOp::BitXor => "xor",
        };
        format!(
            "{} = {name} {}, {}",
            self.value(dest),
            self.typed(left),
            self.value(right)
        )
    }

    fn compare(&self, op: CompareOp, dest: &Operand, left: &Operand, right: &Operand) -> String {
        let signed = left.ty().is_signed();
        let predicate = match op {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt if signed => "sgt",
            CompareOp::Gt => "ugt",
            CompareOp::Lt if signed => "slt",
            CompareOp::Lt => "ult",
            CompareOp::Ge if signed => "sge",
            CompareOp::Ge => "uge",
            CompareOp::Le if signed => "sle",
            CompareOp::Le => "ule",
        };
        format!(
            "{} = icmp {predicate} {}, {}",
            self.value(dest),
            self.typed(left),
            self.value(right)
        )
    }

    fn jump(&self, label: Label) -> String {
        format!("br label {}", self.label_ref(label))
    }

    fn branch(&self, condition: &Operand, on_true: Label, on_false: Label) -> String {
        format!(
            "br {}, label {}, label {}",
            self.typed(condition),
            self.label_ref(on_true),
            self.label_ref(on_false)
        )
    }

    fn phi(&self, dest: &Operand, incoming: &[(Operand, Label)]) -> String {
        let pairs: Vec<String> = incoming
            .iter()
            .map(|(value, label)| format!("[ {}, {} ]", self.value(value), self.label_ref(*label)))
            .collect();
        format!(
            "{} = phi {} {}",
            self.value(dest),
            self.ty(dest.ty()),
            pairs.join(", ")
        )
    }

    fn call(
        &self,
        dest: Option<&Operand>,
        callee: &str,
        signature: &Signature,
        args: &[Operand],
    ) -> String {
        let args: Vec<String> = args.iter().map(|a| self.typed(a)).collect();
        // Variadic callees need their full function type at the call site.
        let callee_type = if signature.variadic {
            format!(
                "{} ({})",
                self.ty(&signature.return_type),
                self.params(signature)
            )
        } else {
            self.ty(&signature.return_type)
        };
        let call = format!("call {callee_type} @{callee}({})", args.join(", "));
        match dest {
            Some(dest) => format!("{} = {call}", self.value(dest)),
            None => call,
        }
    }

    fn ret(&self, value: Option<&Operand>) -> String {
        match value {
            Some(value) => format!("ret {}", self.typed(value)),
            None => "ret void".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(id: u32, ty: IrType) -> Operand {
        Operand::Temp { id, ty }
    }

    #[test]
    fn string_literals_are_nul_terminated() {
        let t = LlvmTemplate;
        assert_eq!(
            t.string_literal(".str0", "hi \"you\"\n"),
            r#"@.str0 = private unnamed_addr constant [10 x i8] c"hi \22you\22\0A\00""#
        );
    }

    #[test]
    fn memory_instructions() {
        let t = LlvmTemplate;
        let slot = temp(0, IrType::pointer_to(IrType::I32));
        let value = temp(1, IrType::I32);
        assert_eq!(t.alloca(&slot, &IrType::I32, 1), "%t.0 = alloca i32, i32 1");
        assert_eq!(t.load(&value, &slot), "%t.1 = load i32, i32* %t.0");
        assert_eq!(t.store(&value, &slot), "store i32 %t.1, i32* %t.0");

        let receiver = Operand::Named {
            name: "self".into(),
            ty: IrType::pointer_to(IrType::Record("Shape".into())),
        };
        let field = temp(2, IrType::pointer_to(IrType::I32));
        assert_eq!(
            t.get_element_ptr(&field, &receiver, &[0, 2]),
            "%t.2 = getelementptr inbounds %Shape, %Shape* %self, i32 0, i32 2"
        );
    }

    #[test]
    fn control_flow() {
        let t = LlvmTemplate;
        let flag = temp(3, IrType::Bool);
        assert_eq!(t.jump(Label(2)), "br label %label.2");
        assert_eq!(
            t.branch(&flag, Label(1), Label(2)),
            "br i1 %t.3, label %label.1, label %label.2"
        );
        assert_eq!(
            t.phi(&temp(4, IrType::Bool), &[(flag, Label(0)), (Operand::bool(true), Label(1))]),
            "%t.4 = phi i1 [ %t.3, %label.0 ], [ true, %label.1 ]"
        );
        assert_eq!(t.ret(None), "ret void");
    }

    #[test]
    fn variadic_calls_spell_out_the_callee_type() {
        let t = LlvmTemplate;
        let signature = Signature {
            return_type: IrType::I32,
            params: vec![IrType::pointer_to(IrType::I8)],
            variadic: true,
        };
        let format = temp(0, IrType::pointer_to(IrType::I8));
        assert_eq!(
            t.call(
                Some(&temp(1, IrType::I32)),
                "printf",
                &signature,
                &[format, Operand::int(7, IrType::I32)]
            ),
            "%t.1 = call i32 (i8*, ...) @printf(i8* %t.0, i32 7)"
        );
    }

    #[test]
    fn unsigned_operations() {
        let t = LlvmTemplate;
        let u8_ty = IrType::Int {
            bits: 8,
            signed: false,
        };
        let a = temp(0, u8_ty.clone());
        assert_eq!(
            t.arithmetic(ArithmeticOp::Div, &temp(1, u8_ty.clone()), &a, &Operand::int(2, u8_ty)),
            "%t.1 = udiv i8 %t.0, 2"
        );
        assert_eq!(
            t.compare(CompareOp::Lt, &temp(2, IrType::Bool), &a, &a),
            "%t.2 = icmp ult i8 %t.0, %t.0"
        );
    }
}
