//! Built-in demo programs.
//!
//! No parser exists; a front end constructs blocks by hand. These are
//! the programs the pipeline is usually exercised with: a membrane
//! current contribution in the shape a mechanism compiler emits, and a
//! constant-heavy body that feeds the folder.

use arblang_ast::{Block, Expr, Item, TypedVar};

/// Names of the available demos, in listing order.
pub fn list() -> &'static [&'static str] {
    &["current", "folding"]
}

/// Looks up a demo block by name.
pub fn build(name: &str) -> Option<Block> {
    match name {
        "current" => Some(membrane_current()),
        "folding" => Some(constant_folding()),
        _ => None,
    }
}

/// The ohmic current contribution of a density mechanism:
///
/// ```text
/// struct ion_state       { iconc: float, econc: float }
/// struct current_contrib { i: float, g: float }
/// struct cell            { v: float, temp: float, leak: ion_state }
/// struct state           { m: float }
/// struct param           { g0: float, erev: float }
/// func current(p: param, s: state, c: cell) -> current_contrib {
///     create current_contrib(((c.v - p.erev) * p.g0) * s.m, p.g0 * s.m)
/// }
/// ```
fn membrane_current() -> Block {
    let i = Expr::mul(
        Expr::mul(
            Expr::sub(Expr::access("c", "v"), Expr::access("p", "erev")),
            Expr::access("p", "g0"),
        ),
        Expr::access("s", "m"),
    );
    let g = Expr::mul(Expr::access("p", "g0"), Expr::access("s", "m"));

    Block::new(vec![
        Item::strukt(
            "ion_state",
            vec![
                TypedVar::new("iconc", "float"),
                TypedVar::new("econc", "float"),
            ],
        ),
        Item::strukt(
            "current_contrib",
            vec![TypedVar::new("i", "float"), TypedVar::new("g", "float")],
        ),
        Item::strukt(
            "cell",
            vec![
                TypedVar::new("v", "float"),
                TypedVar::new("temp", "float"),
                TypedVar::new("leak", "ion_state"),
            ],
        ),
        Item::strukt("state", vec![TypedVar::new("m", "float")]),
        Item::strukt(
            "param",
            vec![TypedVar::new("g0", "float"), TypedVar::new("erev", "float")],
        ),
        Item::func(
            "current",
            "current_contrib",
            vec![
                TypedVar::new("p", "param"),
                TypedVar::new("s", "state"),
                TypedVar::new("c", "cell"),
            ],
            Expr::create("current_contrib", vec![i, g]),
        ),
    ])
}

/// A constant-heavy body: everything here folds down to two literals.
///
/// ```text
/// func weighted() -> float {
///     let w = 0.1 in let a = 3 in (a + w) * (a + w)
/// }
/// ```
fn constant_folding() -> Block {
    Block::new(vec![Item::func(
        "weighted",
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
