//! Common-subexpression elimination.
//!
//! Walks each function's let chain in order, keeping the list of values
//! seen so far and a rename table for displaced binders. A let whose
//! value is structurally equal to an earlier one is rewritten to
//! reference the earlier binder; a let whose value is a bare reference
//! is treated as an alias and only feeds the rename table. Dead
//! duplicates are left for a following dead-let run.
//!
//! Commutative operands are not normalised: `a + b` and `b + a` are
//! distinct values.

use std::collections::HashMap;

use arblang_ir::{Handle, Node, NodeKind, Program, VarDef};

use crate::Pass;

/// Common-subexpression elimination over every function body.
#[derive(Debug)]
pub struct CommonSubexprElimination;

impl Pass for CommonSubexprElimination {
    fn name(&self) -> &str {
        "cse"
    }

    fn run(&self, program: &mut Program) -> bool {
        let functions: Vec<Handle<Node>> = program
            .statements()
            .filter(|&h| matches!(program.nodes[h].kind, NodeKind::Func { .. }))
            .collect();
        let mut changed = false;
        for func in functions {
            changed |= run_on_function(program, func);
        }
        changed
    }
}

/// Runs the single-pass elimination. Idempotent: a second run finds
/// nothing to rewrite.
pub fn eliminate_common_subexpressions(program: &mut Program) {
    CommonSubexprElimination.run(program);
}

fn run_on_function(program: &mut Program, func: Handle<Node>) -> bool {
    let NodeKind::Func { body, .. } = program.nodes[func].kind else {
        return false;
    };

    let mut seen: Vec<(Handle<Node>, Handle<VarDef>)> = Vec::new();
    let mut rename: HashMap<Handle<VarDef>, Handle<VarDef>> = HashMap::new();
    let mut changed = false;

    let mut cursor = body;
    loop {
        let NodeKind::Let { var, value, scope } = program.nodes[cursor].kind else {
            // Terminal expression: displaced binders may be referenced here.
            changed |= apply_renames(program, cursor, &rename);
            break;
        };

        changed |= apply_renames(program, value, &rename);

        // An alias binds no new value; later references go straight to
        // its target.
        if let NodeKind::VarRef(target) = program.nodes[value].kind {
            rename.insert(var, target);
            cursor = scope;
            continue;
        }

        let prior = seen
            .iter()
            .find(|&&(v, _)| values_equal(program, v, value))
            .map(|&(_, binder)| binder);
        match prior {
            Some(binder) => {
                let ty = program.defs[binder].ty;
                program.nodes[value] = Node {
                    kind: NodeKind::VarRef(binder),
                    ty: Some(ty),
                };
                rename.insert(var, binder);
                changed = true;
            }
            None => seen.push((value, var)),
        }
        cursor = scope;
    }
    changed
}

/// Rewrites references to displaced binders inside a value or terminal
/// expression. Returns `true` if any target changed.
fn apply_renames(
    program: &mut Program,
    handle: Handle<Node>,
    rename: &HashMap<Handle<VarDef>, Handle<VarDef>>,
) -> bool {
    if rename.is_empty() {
        return false;
    }
    let targets: Vec<Handle<Node>> = match &program.nodes[handle].kind {
        NodeKind::VarRef(_) => vec![handle],
        NodeKind::Binary { left, right, .. } => vec![*left, *right],
        NodeKind::Access { object, .. } => vec![*object],
        NodeKind::Create { fields } => fields.clone(),
        NodeKind::Apply { args } => args.clone(),
        _ => return false,
    };

    let mut changed = false;
    for target in targets {
        if let NodeKind::VarRef(def) = program.nodes[target].kind
            && let Some(&replacement) = rename.get(&def)
        {
            program.nodes[target].kind = NodeKind::VarRef(replacement);
            changed = true;
        }
    }
    changed
}

/// Structural equality of let values: literals by value, references by
/// target, binaries by operator and atomic operands, accesses by object
/// target and field index, creates and applies by type identity and
/// pairwise atomic comparison. Anything else is not equal.
fn values_equal(program: &Program, a: Handle<Node>, b: Handle<Node>) -> bool {
    match (&program.nodes[a].kind, &program.nodes[b].kind) {
        (NodeKind::FloatLit(x), NodeKind::FloatLit(y)) => x == y,
        (NodeKind::VarRef(x), NodeKind::VarRef(y)) => x == y,
        (
            NodeKind::Binary {
                op: op_a,
                left: la,
                right: ra,
            },
            NodeKind::Binary {
                op: op_b,
                left: lb,
                right: rb,
            },
        ) => op_a == op_b && atoms_equal(program, *la, *lb) && atoms_equal(program, *ra, *rb),
        (
            NodeKind::Access {
                object: oa,
                index: ia,
            },
            NodeKind::Access {
                object: ob,
                index: ib,
            },
        ) => ia == ib && atoms_equal(program, *oa, *ob),
        (NodeKind::Create { fields: fa }, NodeKind::Create { fields: fb }) => {
            program.nodes[a].ty == program.nodes[b].ty
                && fa.len() == fb.len()
                && fa
                    .iter()
                    .zip(fb)
                    .all(|(&x, &y)| atoms_equal(program, x, y))
        }
        (NodeKind::Apply { args: aa }, NodeKind::Apply { args: ab }) => {
            program.nodes[a].ty == program.nodes[b].ty
                && aa.len() == ab.len()
                && aa
                    .iter()
                    .zip(ab)
                    .all(|(&x, &y)| atoms_equal(program, x, y))
        }
        _ => false,
    }
}

fn atoms_equal(program: &Program, a: Handle<Node>, b: Handle<Node>) -> bool {
    match (&program.nodes[a].kind, &program.nodes[b].kind) {
        (NodeKind::FloatLit(x), NodeKind::FloatLit(y)) => x == y,
        (NodeKind::VarRef(x), NodeKind::VarRef(y)) => x == y,
        _ => false,
    }
}
