//! S-expression text dump of a lowered program.

use std::fmt;

use crate::arena::Handle;
use crate::node::{BinaryOp, Node, NodeKind, Program};
use crate::types::format_type;

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
        }
    }
}

/// Renders the nested IR rooted at [`Program::root`] as s-expressions:
/// `(let_s … in …)` for structs, `(let_f … in …)` for functions,
/// `(let_v (x:ty (value)) in …)` for value lets, `( + a b)` for
/// arithmetic, `v.at(i)` for field access, `(create T(…))`,
/// `(apply F(…))`, and `()` for the halt terminator.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();
    write_node(program, &mut out, program.root, 0);
    out.push('\n');
    out
}

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

fn type_name(program: &Program, ty: Option<Handle<crate::types::Type>>) -> String {
    match ty {
        Some(h) => format_type(&program.types[h], &program.types),
        None => "?".into(),
    }
}

/// Writes a value-position expression on one line. Operands are atoms
/// after canonicalisation, so these never need to break.
fn write_value(program: &Program, out: &mut String, handle: Handle<Node>) {
    match &program.nodes[handle].kind {
        NodeKind::FloatLit(v) => out.push_str(&format!("{v}")),
        NodeKind::VarRef(def) => out.push_str(&program.defs[*def].name),
        NodeKind::Binary { op, left, right } => {
            out.push_str(&format!("( {op} "));
            write_value(program, out, *left);
            out.push(' ');
            write_value(program, out, *right);
            out.push(')');
        }
        NodeKind::Access { object, index } => {
            write_value(program, out, *object);
            out.push_str(&format!(".at({index})"));
        }
        NodeKind::Create { fields } => {
            let ty = type_name(program, program.nodes[handle].ty);
            out.push_str(&format!("(create {ty}("));
            for f in fields {
                write_value(program, out, *f);
                out.push(' ');
            }
            out.push_str("))");
        }
        NodeKind::Apply { args } => {
            let ty = type_name(program, program.nodes[handle].ty);
            out.push_str(&format!("(apply {ty}("));
            for a in args {
                write_value(program, out, *a);
                out.push(' ');
            }
            out.push_str("))");
        }
        // Lets in value position only occur in not-yet-canonical bodies.
        other => out.push_str(&format!("<{other:?}>")),
    }
}

fn write_node(program: &Program, out: &mut String, handle: Handle<Node>, indent: usize) {
    match &program.nodes[handle].kind {
        NodeKind::Struct {
            name,
            fields,
            scope,
        } => {
            out.push_str(&format!("{}(let_s ({name} (", pad(indent)));
            for f in fields {
                let def = &program.defs[*f];
                out.push_str(&format!(
                    "{}:{} ",
                    def.name,
                    type_name(program, Some(def.ty))
                ));
            }
            out.push_str("))\n");
            out.push_str(&format!("{}in\n", pad(indent)));
            write_node(program, out, *scope, indent + 4);
            out.push_str(&format!("\n{})", pad(indent)));
        }
        NodeKind::Func {
            name,
            params,
            body,
            scope,
        } => {
            out.push_str(&format!("{}(let_f ({name} (", pad(indent)));
            for p in params {
                let def = &program.defs[*p];
                out.push_str(&format!(
                    "{}:{} ",
                    def.name,
                    type_name(program, Some(def.ty))
                ));
            }
            out.push_str(")\n");
            write_node(program, out, *body, indent + 4);
            out.push_str(&format!(")\n{}in\n", pad(indent)));
            write_node(program, out, *scope, indent + 4);
            out.push_str(&format!("\n{})", pad(indent)));
        }
        NodeKind::Let { var, value, scope } => {
            let def = &program.defs[*var];
            out.push_str(&format!(
                "{}(let_v ({}:{} (",
                pad(indent),
                def.name,
                type_name(program, Some(def.ty))
            ));
            write_value(program, out, *value);
            out.push_str("))\n");
            out.push_str(&format!("{}in\n", pad(indent)));
            write_node(program, out, *scope, indent + 4);
            out.push_str(&format!("\n{})", pad(indent)));
        }
        NodeKind::Halt => {
            out.push_str(&format!("{}()", pad(indent)));
        }
        _ => {
            out.push_str(&pad(indent));
            write_value(program, out, handle);
        }
    }
}
