//! Universal invariants that must hold for every well-formed input.

mod common;

use arblang_ir::{Handle, Node, NodeKind, Program};
use common::*;

/// Walks every node reachable from a function body and applies `check`.
fn walk_body(program: &Program, body: Handle<Node>, check: &mut impl FnMut(Handle<Node>)) {
    check(body);
    match &program.nodes[body].kind {
        NodeKind::Let { value, scope, .. } => {
            walk_body(program, *value, check);
            walk_body(program, *scope, check);
        }
        NodeKind::Binary { left, right, .. } => {
            walk_body(program, *left, check);
            walk_body(program, *right, check);
        }
        NodeKind::Access { object, .. } => walk_body(program, *object, check),
        NodeKind::Create { fields } => {
            for &f in fields {
                walk_body(program, f, check);
            }
        }
        NodeKind::Apply { args } => {
            for &a in args {
                walk_body(program, a, check);
            }
        }
        _ => {}
    }
}

fn for_each_function_body(program: &Program, mut f: impl FnMut(Handle<Node>)) {
    for statement in program.statements() {
        if let NodeKind::Func { body, .. } = program.nodes[statement].kind {
            f(body);
        }
    }
}

#[test]
fn validator_accepts_every_lowered_program() {
    for block in all_scenarios() {
        let program = lower(&block);
        arblang_opt::validate(&program).expect("validator rejected a lowered program");
    }
}

#[test]
fn canonical_operands_after_lowering() {
    for block in all_scenarios() {
        let program = lower(&block);
        for_each_function_body(&program, |body| {
            walk_body(&program, body, &mut |h| {
                match &program.nodes[h].kind {
                    NodeKind::Binary { left, right, .. } => {
                        assert!(program.nodes[*left].kind.is_atom());
                        assert!(program.nodes[*right].kind.is_atom());
                    }
                    NodeKind::Access { object, .. } => {
                        assert!(matches!(program.nodes[*object].kind, NodeKind::VarRef(_)));
                    }
                    NodeKind::Create { fields } => {
                        assert!(fields.iter().all(|&f| program.nodes[f].kind.is_atom()));
                    }
                    NodeKind::Apply { args } => {
                        assert!(args.iter().all(|&a| program.nodes[a].kind.is_atom()));
                    }
                    _ => {}
                }
            });
        });
    }
}

#[test]
fn bodies_are_let_chains_ending_in_an_atom() {
    for block in all_scenarios() {
        let program = lower(&block);
        for_each_function_body(&program, |body| {
            let mut cursor = body;
            while let NodeKind::Let { scope, .. } = program.nodes[cursor].kind {
                cursor = scope;
            }
            assert!(
                program.nodes[cursor].kind.is_atom(),
                "chain must terminate in an atom"
            );
        });
    }
}

#[test]
fn each_optimiser_preserves_validity() {
    type Opt = fn(&mut Program);
    let optimisers: [(&str, Opt); 3] = [
        ("constant propagation", arblang_opt::constant_propagate),
        ("dead-let elimination", arblang_opt::eliminate_dead_code),
        ("cse", arblang_opt::eliminate_common_subexpressions),
    ];
    for (name, optimiser) in optimisers {
        for block in all_scenarios() {
            let mut program = lower(&block);
            optimiser(&mut program);
            arblang_opt::validate(&program)
                .unwrap_or_else(|e| panic!("{name} broke validity: {e}"));
        }
    }
}

#[test]
fn pipeline_preserves_validity() {
    for block in all_scenarios() {
        // run_pipeline validates before and after.
        run_pipeline(&block);
    }
}

#[test]
fn constant_propagation_is_idempotent() {
    for block in all_scenarios() {
        let mut program = lower(&block);
        arblang_opt::constant_propagate(&mut program);
        let once = snapshot(&program);
        arblang_opt::constant_propagate(&mut program);
        assert_eq!(once, snapshot(&program));
    }
}

#[test]
fn cse_is_idempotent() {
    for block in all_scenarios() {
        let mut program = lower(&block);
        arblang_opt::eliminate_common_subexpressions(&mut program);
        let once = snapshot(&program);
        arblang_opt::eliminate_common_subexpressions(&mut program);
        assert_eq!(once, snapshot(&program));
    }
}

#[test]
fn dead_let_elimination_leaves_no_unreferenced_binder() {
    for block in all_scenarios() {
        let mut program = lower(&block);
        arblang_opt::eliminate_dead_code(&mut program);

        // Collect every reference target reachable from the bodies.
        let mut referenced = std::collections::HashSet::new();
        for_each_function_body(&program, |body| {
            walk_body(&program, body, &mut |h| {
                if let NodeKind::VarRef(def) = program.nodes[h].kind {
                    referenced.insert(def);
                }
            });
        });

        // Every surviving let binder must be referenced somewhere.
        for_each_function_body(&program, |body| {
            let mut cursor = body;
            while let NodeKind::Let { var, scope, .. } = program.nodes[cursor].kind {
                assert!(
                    referenced.contains(&var),
                    "binder '{}' survived without a reference",
                    program.defs[var].name
                );
                cursor = scope;
            }
        });
    }
}

#[test]
fn folding_matches_native_float_semantics() {
    use arblang_ast::{Block, Expr, Item, TypedVar};

    let cases: Vec<(Expr, fn(f64) -> bool)> = vec![
        (Expr::div(Expr::float(0.0), Expr::float(0.0)), |v| {
            v.is_nan()
        }),
        (Expr::div(Expr::float(1.0), Expr::float(0.0)), |v| {
            v == f64::INFINITY
        }),
        (Expr::div(Expr::float(-1.0), Expr::float(0.0)), |v| {
            v == f64::NEG_INFINITY
        }),
        (Expr::mul(Expr::float(0.1), Expr::float(3.0)), |v| {
            v == 0.1 * 3.0
        }),
        (Expr::sub(Expr::float(1.0), Expr::float(0.75)), |v| {
            v == 0.25
        }),
    ];
    for (expr, check) in cases {
        let block = Block::new(vec![Item::func("g", "float", vec![], expr)]);
        let mut program = lower(&block);
        arblang_opt::constant_propagate(&mut program);
        let (lets, _) = body_chain(&program, "g");
        let NodeKind::FloatLit(v) = program.nodes[lets.last().unwrap().1].kind else {
            panic!("two-literal operation must fold");
        };
        assert!(check(v), "folded to unexpected value {v}");
    }

    // A non-literal operand is never evaluated.
    let block = Block::new(vec![Item::func(
        "f",
        "float",
        vec![TypedVar::new("p", "float")],
        Expr::div(Expr::var("p"), Expr::float(0.0)),
    )]);
    let mut program = lower(&block);
    arblang_opt::constant_propagate(&mut program);
    let (lets, _) = body_chain(&program, "f");
    assert!(matches!(
        program.nodes[lets.last().unwrap().1].kind,
        NodeKind::Binary { .. }
    ));
}

#[test]
fn no_structurally_equal_values_after_cse_and_cleanup() {
    for block in all_scenarios() {
        let mut program = lower(&block);
        arblang_opt::eliminate_common_subexpressions(&mut program);
        arblang_opt::eliminate_dead_code(&mut program);

        for statement in program.statements().collect::<Vec<_>>() {
            let NodeKind::Func { name, .. } = &program.nodes[statement].kind else {
                continue;
            };
            let (lets, _) = body_chain(&program, name);
            for (i, (_, a)) in lets.iter().enumerate() {
                for (_, b) in &lets[i + 1..] {
                    assert!(
                        !shallow_equal(&program, *a, *b),
                        "duplicate values survived CSE"
                    );
                }
            }
        }
    }
}

/// Structural equality on let values, mirroring the CSE comparison.
fn shallow_equal(program: &Program, a: Handle<Node>, b: Handle<Node>) -> bool {
    fn atom_eq(program: &Program, a: Handle<Node>, b: Handle<Node>) -> bool {
        match (&program.nodes[a].kind, &program.nodes[b].kind) {
            (NodeKind::FloatLit(x), NodeKind::FloatLit(y)) => x == y,
            (NodeKind::VarRef(x), NodeKind::VarRef(y)) => x == y,
            _ => false,
        }
    }
    match (&program.nodes[a].kind, &program.nodes[b].kind) {
        (NodeKind::FloatLit(x), NodeKind::FloatLit(y)) => x == y,
        (NodeKind::VarRef(x), NodeKind::VarRef(y)) => x == y,
        (
            NodeKind::Binary {
                op: oa,
                left: la,
                right: ra,
            },
            NodeKind::Binary {
                op: ob,
                left: lb,
                right: rb,
            },
        ) => oa == ob && atom_eq(program, *la, *lb) && atom_eq(program, *ra, *rb),
        (
            NodeKind::Access {
                object: xa,
                index: ia,
            },
            NodeKind::Access {
                object: xb,
                index: ib,
            },
        ) => ia == ib && atom_eq(program, *xa, *xb),
        (NodeKind::Create { fields: fa }, NodeKind::Create { fields: fb }) => {
            program.nodes[a].ty == program.nodes[b].ty
                && fa.len() == fb.len()
                && fa.iter().zip(fb).all(|(&x, &y)| atom_eq(program, x, y))
        }
        (NodeKind::Apply { args: aa }, NodeKind::Apply { args: ab }) => {
            program.nodes[a].ty == program.nodes[b].ty
                && aa.len() == ab.len()
                && aa.iter().zip(ab).all(|(&x, &y)| atom_eq(program, x, y))
        }
        _ => false,
    }
}

/// A printable snapshot of every function body, for idempotence checks.
fn snapshot(program: &Program) -> String {
    arblang_ir::dump_program(program)
}
