//! Dead-let elimination.
//!
//! A use-set analysis classifies every binder as used or unused; a let
//! whose binder is unused is spliced out of its chain. Function
//! parameters are an external contract and always count as used.
//! Dropping a let can orphan the binders its value referenced, so the
//! pass is re-run until the unused set is empty.

use std::collections::HashSet;

use arblang_ir::{Handle, Node, NodeKind, Program, VarDef};

use crate::Pass;

/// One round of dead-let elimination over every function body.
#[derive(Debug)]
pub struct DeadLetElimination;

impl Pass for DeadLetElimination {
    fn name(&self) -> &str {
        "dead-let"
    }

    fn run(&self, program: &mut Program) -> bool {
        let used = collect_used(program);
        let functions: Vec<Handle<Node>> = program
            .statements()
            .filter(|&h| matches!(program.nodes[h].kind, NodeKind::Func { .. }))
            .collect();
        let mut changed = false;
        for func in functions {
            changed |= run_on_function(program, func, &used);
        }
        changed
    }
}

/// Runs dead-let elimination to a fixed point.
pub fn eliminate_dead_code(program: &mut Program) {
    while DeadLetElimination.run(program) {}
}

/// Collects every binder with a reference targeting it, plus all
/// function parameters.
fn collect_used(program: &Program) -> HashSet<Handle<VarDef>> {
    let mut used = HashSet::new();
    for statement in program.statements() {
        if let NodeKind::Func { params, body, .. } = &program.nodes[statement].kind {
            used.extend(params.iter().copied());
            mark(program, *body, &mut used);
        }
    }
    used
}

fn mark(program: &Program, handle: Handle<Node>, used: &mut HashSet<Handle<VarDef>>) {
    match &program.nodes[handle].kind {
        NodeKind::VarRef(def) => {
            used.insert(*def);
        }
        NodeKind::Let { value, scope, .. } => {
            mark(program, *value, used);
            mark(program, *scope, used);
        }
        NodeKind::Binary { left, right, .. } => {
            mark(program, *left, used);
            mark(program, *right, used);
        }
        NodeKind::Access { object, .. } => mark(program, *object, used),
        NodeKind::Create { fields } => {
            for &field in fields {
                mark(program, field, used);
            }
        }
        NodeKind::Apply { args } => {
            for &arg in args {
                mark(program, arg, used);
            }
        }
        NodeKind::FloatLit(_)
        | NodeKind::Func { .. }
        | NodeKind::Struct { .. }
        | NodeKind::Halt => {}
    }
}

fn run_on_function(
    program: &mut Program,
    func: Handle<Node>,
    used: &HashSet<Handle<VarDef>>,
) -> bool {
    let NodeKind::Func { body, .. } = program.nodes[func].kind else {
        return false;
    };

    let mut changed = false;
    let spliced = skip_dead(program, body, used, &mut changed);
    if spliced != body
        && let NodeKind::Func { body, .. } = &mut program.nodes[func].kind
    {
        *body = spliced;
    }

    let mut cursor = spliced;
    while let NodeKind::Let { scope, .. } = program.nodes[cursor].kind {
        let next = skip_dead(program, scope, used, &mut changed);
        if next != scope
            && let NodeKind::Let { scope, .. } = &mut program.nodes[cursor].kind
        {
            *scope = next;
        }
        cursor = next;
    }
    changed
}

/// Skips over consecutive lets whose binders are unused, returning the
/// first node that survives.
fn skip_dead(
    program: &Program,
    mut handle: Handle<Node>,
    used: &HashSet<Handle<VarDef>>,
    changed: &mut bool,
) -> Handle<Node> {
    while let NodeKind::Let { var, scope, .. } = program.nodes[handle].kind {
        if used.contains(&var) {
            break;
        }
        handle = scope;
        *changed = true;
    }
    handle
}
