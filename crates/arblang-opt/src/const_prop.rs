//! Constant propagation.
//!
//! Records let bindings of literals, substitutes references to known
//! constants inside operand slots, and folds binary operations whose
//! operands are both literals using native IEEE-754 arithmetic. Driven
//! to a fixed point: folding a value feeds the next round's table.

use std::collections::HashMap;

use arblang_ir::{BinaryOp, Handle, Node, NodeKind, Program, VarDef};

use crate::Pass;

/// One round of constant propagation over every function body.
#[derive(Debug)]
pub struct ConstantPropagation;

impl Pass for ConstantPropagation {
    fn name(&self) -> &str {
        "const-prop"
    }

    fn run(&self, program: &mut Program) -> bool {
        let mut changed = false;
        let functions: Vec<Handle<Node>> = program
            .statements()
            .filter(|&h| matches!(program.nodes[h].kind, NodeKind::Func { .. }))
            .collect();
        for func in functions {
            changed |= run_on_function(program, func);
        }
        changed
    }
}

/// Runs constant propagation to a fixed point.
pub fn constant_propagate(program: &mut Program) {
    while ConstantPropagation.run(program) {}
}

fn run_on_function(program: &mut Program, func: Handle<Node>) -> bool {
    let NodeKind::Func { body, .. } = program.nodes[func].kind else {
        return false;
    };

    let mut changed = false;
    let mut constants: HashMap<Handle<VarDef>, f64> = HashMap::new();
    let mut cursor = body;
    while let NodeKind::Let { var, value, scope } = program.nodes[cursor].kind {
        // Record a literal binding; rewrite a reference to a known
        // constant into the literal itself. A reference to a
        // non-constant binder is a no-op.
        match program.nodes[value].kind {
            NodeKind::FloatLit(v) => {
                constants.insert(var, v);
            }
            NodeKind::VarRef(target) => {
                if let Some(&v) = constants.get(&target) {
                    program.nodes[value].kind = NodeKind::FloatLit(v);
                    constants.insert(var, v);
                    changed = true;
                }
            }
            _ => {}
        }

        changed |= substitute_operands(program, value, &constants);

        // Fold a binary whose operands are now both literals. The
        // resulting literal is picked up by the next round.
        if let NodeKind::Binary { op, left, right } = program.nodes[value].kind
            && let NodeKind::FloatLit(l) = program.nodes[left].kind
            && let NodeKind::FloatLit(r) = program.nodes[right].kind
        {
            program.nodes[value].kind = NodeKind::FloatLit(fold(op, l, r));
            changed = true;
        }

        cursor = scope;
    }
    changed
}

/// Replaces known-constant references in the operand slots of a binary,
/// create, or apply value with their literals.
fn substitute_operands(
    program: &mut Program,
    value: Handle<Node>,
    constants: &HashMap<Handle<VarDef>, f64>,
) -> bool {
    let operands: Vec<Handle<Node>> = match &program.nodes[value].kind {
        NodeKind::Binary { left, right, .. } => vec![*left, *right],
        NodeKind::Create { fields } => fields.clone(),
        NodeKind::Apply { args } => args.clone(),
        _ => return false,
    };

    let mut changed = false;
    for operand in operands {
        if let NodeKind::VarRef(target) = program.nodes[operand].kind
            && let Some(&v) = constants.get(&target)
        {
            program.nodes[operand].kind = NodeKind::FloatLit(v);
            changed = true;
        }
    }
    changed
}

/// IEEE-754 evaluation: `0/0` is NaN, `x/0` is a signed infinity.
fn fold(op: BinaryOp, l: f64, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
    }
}
