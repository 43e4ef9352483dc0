//! Shared fixtures: scenario programs and chain inspection helpers.

use arblang_ast::{Block, Expr, Item, TypedVar};
use arblang_ir::{Handle, Node, NodeKind, Program};

/// Lowers a block, failing the test on any error.
#[allow(dead_code)]
pub fn lower(block: &Block) -> Program {
    arblang_lower::lower(block).expect("lowering failed")
}

/// Runs the full optimisation pipeline: constant propagation, dead-let
/// elimination, CSE, and a final dead-let sweep, each to its fixed point.
#[allow(dead_code)]
pub fn run_pipeline(block: &Block) -> Program {
    let mut program = lower(block);
    arblang_opt::validate(&program).expect("lowered IR failed validation");
    arblang_opt::constant_propagate(&mut program);
    arblang_opt::eliminate_dead_code(&mut program);
    arblang_opt::eliminate_common_subexpressions(&mut program);
    arblang_opt::eliminate_dead_code(&mut program);
    arblang_opt::validate(&program).expect("optimised IR failed validation");
    program
}

/// The body let chain of a named function: `(binder name, value handle)`
/// pairs in order, plus the terminal node.
#[allow(dead_code)]
pub fn body_chain(program: &Program, name: &str) -> (Vec<(String, Handle<Node>)>, Handle<Node>) {
    let func = program.function(name).expect("no such function");
    let NodeKind::Func { body, .. } = program.nodes[func].kind else {
        unreachable!("function handle is not a Func node");
    };
    let mut lets = Vec::new();
    let mut cursor = body;
    while let NodeKind::Let { var, value, scope } = program.nodes[cursor].kind {
        lets.push((program.defs[var].name.clone(), value));
        cursor = scope;
    }
    (lets, cursor)
}

/// Counts surviving let values of a function matching a predicate.
#[allow(dead_code)]
pub fn count_values(program: &Program, name: &str, pred: impl Fn(&NodeKind) -> bool) -> usize {
    let (lets, _) = body_chain(program, name);
    lets.iter()
        .filter(|(_, v)| pred(&program.nodes[*v].kind))
        .count()
}

/// S1: `func f(p: float) -> float { p + p }`.
#[allow(dead_code)]
pub fn trivial_function() -> Block {
    Block::new(vec![Item::func(
        "f",
        "float",
        vec![TypedVar::new("p", "float")],
        Expr::add(Expr::var("p"), Expr::var("p")),
    )])
}

/// S2: `func g() -> float { let w = 0.1 in let a = 3 in (a+w)*(a+w) }`.
#[allow(dead_code)]
pub fn constant_folding() -> Block {
    Block::new(vec![Item::func(
        "g",
        "float",
        vec![],
        Expr::binding(
            TypedVar::new("w", "float"),
            Expr::float(0.1),
            Expr::binding(
                TypedVar::new("a", "float"),
                Expr::float(3.0),
                Expr::mul(
                    Expr::add(Expr::var("a"), Expr::var("w")),
                    Expr::add(Expr::var("a"), Expr::var("w")),
                ),
            ),
        ),
    )])
}

/// S3: `func h(s: state) -> current { create current(s.m*s.m, s.m*s.m) }`.
#[allow(dead_code)]
pub fn duplicate_products() -> Block {
    Block::new(vec![
        Item::strukt("state", vec![TypedVar::new("m", "float")]),
        Item::strukt(
            "current",
            vec![TypedVar::new("i", "float"), TypedVar::new("g", "float")],
        ),
        Item::func(
            "h",
            "current",
            vec![TypedVar::new("s", "state")],
            Expr::create(
                "current",
                vec![
                    Expr::mul(Expr::access("s", "m"), Expr::access("s", "m")),
                    Expr::mul(Expr::access("s", "m"), Expr::access("s", "m")),
                ],
            ),
        ),
    ])
}

/// S4: the weighted current contribution with an outer `let w = 0.1`.
#[allow(dead_code)]
pub fn weighted_current() -> Block {
    let i = Expr::mul(
        Expr::mul(
            Expr::mul(
                Expr::sub(Expr::access("c", "v"), Expr::access("p", "erev")),
                Expr::access("p", "g0"),
            ),
            Expr::access("s", "m"),
        ),
        Expr::var("w"),
    );
    let g = Expr::mul(Expr::access("p", "g0"), Expr::access("s", "m"));
    Block::new(vec![
        Item::strukt(
            "param",
            vec![TypedVar::new("g0", "float"), TypedVar::new("erev", "float")],
        ),
        Item::strukt("state", vec![TypedVar::new("m", "float")]),
        Item::strukt(
            "cell",
            vec![TypedVar::new("v", "float"), TypedVar::new("temp", "float")],
        ),
        Item::strukt(
            "current_contrib",
            vec![TypedVar::new("i", "float"), TypedVar::new("g", "float")],
        ),
        Item::func(
            "cur",
            "current_contrib",
            vec![
                TypedVar::new("p", "param"),
                TypedVar::new("s", "state"),
                TypedVar::new("c", "cell"),
            ],
            Expr::binding(
                TypedVar::new("w", "float"),
                Expr::float(0.1),
                Expr::create("current_contrib", vec![i, g]),
            ),
        ),
    ])
}

/// S5: `func k(p: param) -> float { let x = p.g0 in let y = p.erev in x }`.
#[allow(dead_code)]
pub fn unused_binding() -> Block {
    Block::new(vec![
        Item::strukt(
            "param",
            vec![TypedVar::new("g0", "float"), TypedVar::new("erev", "float")],
        ),
        Item::func(
            "k",
            "float",
            vec![TypedVar::new("p", "param")],
            Expr::binding(
                TypedVar::new("x", "float"),
                Expr::access("p", "g0"),
                Expr::binding(
                    TypedVar::new("y", "float"),
                    Expr::access("p", "erev"),
                    Expr::var("x"),
                ),
            ),
        ),
    ])
}

/// Two identical calls to an earlier definition:
/// `func double(x: float) -> float { x + x }`
/// `func quad(y: float) -> float { double(y) + double(y) }`.
#[allow(dead_code)]
pub fn shared_application() -> Block {
    Block::new(vec![
        Item::func(
            "double",
            "float",
            vec![TypedVar::new("x", "float")],
            Expr::add(Expr::var("x"), Expr::var("x")),
        ),
        Item::func(
            "quad",
            "float",
            vec![TypedVar::new("y", "float")],
            Expr::add(
                Expr::apply("double", vec![Expr::var("y")]),
                Expr::apply("double", vec![Expr::var("y")]),
            ),
        ),
    ])
}

/// Every scenario block, for property sweeps.
#[allow(dead_code)]
pub fn all_scenarios() -> Vec<Block> {
    vec![
        trivial_function(),
        constant_folding(),
        duplicate_products(),
        weighted_current(),
        unused_binding(),
        shared_application(),
    ]
}
