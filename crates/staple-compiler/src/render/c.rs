//! C source.
//!
//! Records become `struct`s whose members are named by offset (`m0`,
//! `m1`, ...) since a derived class may reuse an inherited field name.
//! Compiler-introduced names use the `stp_` prefix.
//!
//! C has no phi. Every label records the block control came from in
//! `stp_pred` before marking itself current in `stp_block`, and a phi picks
//! its incoming value by comparing `stp_pred` with each predecessor label.

use std::fmt::Write;

use staple_parser::ast::{ArithmeticOp, CompareOp};

use super::Template;
use crate::ir::{
    ClassRecord, ExternalDecl, FunctionDef, Instruction, IrType, Label, Operand, RecordField,
    Signature,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CTemplate;

impl CTemplate {
    fn ty(&self, ty: &IrType) -> String {
        match ty {
            IrType::Void => "void".into(),
            IrType::Bool => "bool".into(),
            IrType::Int { bits, signed: true } => format!("int{bits}_t"),
            IrType::Int { bits, signed: false } => format!("uint{bits}_t"),
            IrType::Pointer(base) => format!("{}*", self.ty(base)),
            // Only reachable behind a pointer; the element type is what C
            // code indexes.
            IrType::Array(base, _) => self.ty(base),
            IrType::Record(name) => format!("struct {name}"),
        }
    }

    fn value(&self, operand: &Operand) -> String {
        match operand {
            Operand::Const {
                value,
                ty: IrType::Bool,
            } => (*value != 0).to_string(),
            Operand::Const { value, .. } => value.to_string(),
            Operand::Temp { id, .. } => format!("stp_t{id}"),
            Operand::Named { name, .. } => name.clone(),
            Operand::Global { name, .. } => format!("(&{})", global_name(name)),
            Operand::Label(label) => self.label_name(*label),
        }
    }

    fn label_name(&self, label: Label) -> String {
        format!("stp_L{}", label.0)
    }

    /// `T dest = ` prefix of a value-defining statement.
    fn define(&self, dest: &Operand) -> String {
        format!("{} {} = ", self.ty(dest.ty()), self.value(dest))
    }

    fn param_types(&self, signature: &Signature) -> String {
        let mut params: Vec<String> = signature.params.iter().map(|p| self.ty(p)).collect();
        if signature.variadic {
            params.push("...".into());
        }
        if params.is_empty() {
            "void".into()
        } else {
            params.join(", ")
        }
    }

    fn prototype(&self, name: &str, signature: &Signature) -> String {
        format!(
            "{} {name}({});",
            self.ty(&signature.return_type),
            self.param_types(signature)
        )
    }

    fn record(&self, name: &str, fields: &[RecordField]) -> String {
        let mut out = format!("struct {name} {{\n");
        for (index, field) in fields.iter().enumerate() {
            let _ = writeln!(out, "    {} m{index}; /* {} */", self.ty(&field.ty), field.name);
        }
        if fields.is_empty() {
            out.push_str("    char stp_empty;\n");
        }
        out.push_str("};");
        out
    }
}

/// C spelling of a global: `.str0` becomes `stp_str0`.
fn global_name(name: &str) -> String {
    match name.strip_prefix('.') {
        Some(rest) => format!("stp_{}", rest.replace('.', "_")),
        None => name.replace('.', "_"),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b' '..=b'~' => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

impl Template for CTemplate {
    fn prologue(&self, unit: &[Instruction]) -> String {
        let mut out = String::from("#include <stdbool.h>\n#include <stdint.h>\n\n");
        // Prototypes below may name records defined later in the file.
        for instruction in unit {
            match instruction {
                Instruction::DeclareStruct { name, .. } => {
                    let _ = writeln!(out, "struct {name};");
                }
                Instruction::DeclareClass(class) => {
                    let _ = writeln!(
                        out,
                        "struct {};\nstruct {};",
                        class.name, class.dispatch.name
                    );
                }
                _ => {}
            }
        }
        for instruction in unit {
            if let Instruction::DeclareFunction(function) = instruction {
                let _ = writeln!(out, "{}", self.prototype(&function.name, &function.signature));
            }
        }
        out.push('\n');
        out
    }

    fn string_literal(&self, name: &str, text: &str) -> String {
        format!(
            "static int8_t {}[{}] = \"{}\";",
            global_name(name),
            text.len() + 1,
            escape(text)
        )
    }

    fn struct_decl(&self, name: &str, fields: &[RecordField]) -> String {
        self.record(name, fields)
    }

    fn class_decl(&self, class: &ClassRecord) -> String {
        let dispatch = &class.dispatch;
        let mut out = format!("\n/* class {} */\n", class.name);
        let _ = writeln!(out, "{}", self.record(&class.name, &class.fields));
        let _ = writeln!(
            out,
            "struct {} {{\n    const char* name;\n    void* parent;\n    void* slots[{}];\n}};",
            dispatch.name,
            dispatch.slots.len()
        );
        for slot in &dispatch.slots {
            let _ = writeln!(out, "{}", self.prototype(&slot.function, &slot.signature));
        }

        if class.external {
            let _ = write!(out, "extern struct {} {};", dispatch.name, dispatch.instance);
            return out;
        }

        let parent = match &dispatch.parent_instance {
            Some(instance) => format!("&{instance}"),
            None => "0".into(),
        };
        let slots: Vec<String> = dispatch
            .slots
            .iter()
            .map(|slot| format!("(void*){}", slot.function))
            .collect();
        let _ = write!(
            out,
            "struct {} {} = {{ \"{}\", {parent}, {{ {} }} }};",
            dispatch.name,
            dispatch.instance,
            escape(&class.name),
            slots.join(", ")
        );
        out
    }

    fn external(&self, decl: &ExternalDecl) -> String {
        self.prototype(&decl.name, &decl.signature)
    }

    fn function(&self, function: &FunctionDef, body: &[String]) -> String {
        let params: Vec<String> = function
            .params()
            .map(|(name, ty)| format!("{} {name}", self.ty(ty)))
            .collect();
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        let mut out = format!(
            "\n{} {}({params}) {{\n    int stp_pred = -1, stp_block = -1;\n",
            self.ty(&function.signature.return_type),
            function.name
        );
        for (instruction, line) in function.body.iter().zip(body) {
            if matches!(instruction, Instruction::Label(_)) {
                let _ = writeln!(out, "{line}");
            } else {
                let _ = writeln!(out, "    {line}");
            }
        }
        out.push('}');
        out
    }

    fn label(&self, label: Label) -> String {
        format!(
            "{}: stp_pred = stp_block; stp_block = {};",
            self.label_name(label),
            label.0
        )
    }

    fn alloca(&self, dest: &Operand, ty: &IrType, count: u32) -> String {
        let slot = format!("{}_slot", self.value(dest));
        format!(
            "{} {slot}[{count}]; {}{slot};",
            self.ty(ty),
            self.define(dest)
        )
    }

    fn load(&self, dest: &Operand, address: &Operand) -> String {
        format!("{}*{};", self.define(dest), self.value(address))
    }

    fn store(&self, value: &Operand, address: &Operand) -> String {
        format!("*{} = {};", self.value(address), self.value(value))
    }

    fn get_element_ptr(&self, dest: &Operand, base: &Operand, indices: &[u32]) -> String {
        let mut path = self.value(base);
        let mut current = Some(base.ty());
        for index in indices {
            match current {
                Some(IrType::Pointer(element)) | Some(IrType::Array(element, _)) => {
                    let _ = write!(path, "[{index}]");
                    current = Some(element);
                }
                Some(IrType::Record(_)) => {
                    let _ = write!(path, ".m{index}");
                    current = None;
                }
                _ => current = None,
            }
        }
        format!("{}&{path};", self.define(dest))
    }

    fn cast(&self, dest: &Operand, value: &Operand) -> String {
        format!(
            "{}({}){};",
            self.define(dest),
            self.ty(dest.ty()),
            self.value(value)
        )
    }

    fn arithmetic(
        &self,
        op: ArithmeticOp,
        dest: &Operand,
        left: &Operand,
        right: &Operand,
    ) -> String {
        format!(
            "{}{} {} {};",
            self.define(dest),
            self.value(left),
            op.as_str(),
            self.value(right)
        )
    }

    fn compare(&self, op: CompareOp, dest: &Operand, left: &Operand, right: &Operand) -> String {
        format!(
            "{}{} {} {};",
            self.define(dest),
            self.value(left),
            op.as_str(),
            self.value(right)
        )
    }

    fn jump(&self, label: Label) -> String {
        format!("goto {};", self.label_name(label))
    }

    fn branch(&self, condition: &Operand, on_true: Label, on_false: Label) -> String {
        format!(
            "if ({}) goto {}; else goto {};",
            self.value(condition),
            self.label_name(on_true),
            self.label_name(on_false)
        )
    }

    fn phi(&self, dest: &Operand, incoming: &[(Operand, Label)]) -> String {
        let mut select = String::new();
        if let Some(((last, _), rest)) = incoming.split_last() {
            for (value, label) in rest {
                let _ = write!(select, "stp_pred == {} ? {} : ", label.0, self.value(value));
            }
            select.push_str(&self.value(last));
        }
        format!("{}{select};", self.define(dest))
    }

    fn call(
        &self,
        dest: Option<&Operand>,
        callee: &str,
        _signature: &Signature,
        args: &[Operand],
    ) -> String {
        let args: Vec<String> = args.iter().map(|a| self.value(a)).collect();
        let call = format!("{callee}({});", args.join(", "));
        match dest {
            Some(dest) => format!("{}{call}", self.define(dest)),
            None => call,
        }
    }

    fn ret(&self, value: Option<&Operand>) -> String {
        match value {
            Some(value) => format!("return {};", self.value(value)),
            None => "return;".into(),
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
    fn string_storage() {
        let t = CTemplate;
        assert_eq!(
            t.string_literal(".str1", "a\"b\n"),
            r#"static int8_t stp_str1[5] = "a\"b\012";"#
        );
    }

    #[test]
    fn element_pointers_walk_the_pointee() {
        let t = CTemplate;
        let literal = Operand::Global {
            name: ".str0".into(),
            ty: IrType::pointer_to(IrType::Array(Box::new(IrType::I8), 3)),
        };
        assert_eq!(
            t.get_element_ptr(&temp(0, IrType::pointer_to(IrType::I8)), &literal, &[0, 0]),
            "int8_t* stp_t0 = &(&stp_str0)[0][0];"
        );

        let receiver = Operand::Named {
            name: "self".into(),
            ty: IrType::pointer_to(IrType::Record("Shape".into())),
        };
        assert_eq!(
            t.get_element_ptr(&temp(1, IrType::pointer_to(IrType::I32)), &receiver, &[0, 2]),
            "int32_t* stp_t1 = &self[0].m2;"
        );
    }

    #[test]
    fn phi_selects_by_predecessor() {
        let t = CTemplate;
        let incoming = [
            (temp(1, IrType::Bool), Label(0)),
            (temp(2, IrType::Bool), Label(1)),
        ];
        assert_eq!(
            t.phi(&temp(3, IrType::Bool), &incoming),
            "bool stp_t3 = stp_pred == 0 ? stp_t1 : stp_t2;"
        );
        assert_eq!(t.label(Label(2)), "stp_L2: stp_pred = stp_block; stp_block = 2;");
    }

    #[test]
    fn locals() {
        let t = CTemplate;
        let slot = temp(0, IrType::pointer_to(IrType::I32));
        assert_eq!(
            t.alloca(&slot, &IrType::I32, 1),
            "int32_t stp_t0_slot[1]; int32_t* stp_t0 = stp_t0_slot;"
        );
        assert_eq!(t.load(&temp(1, IrType::I32), &slot), "int32_t stp_t1 = *stp_t0;");
    }
}
