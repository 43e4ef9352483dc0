//! Optimisation passes for the Arb-Lang IR.
//!
//! Provides a [`Pass`] trait, a [`PassManager`] with fixed-point
//! iteration, the IR validator, and the built-in passes: constant
//! propagation, dead-let elimination, and common-subexpression
//! elimination.

mod const_prop;
mod cse;
mod dce;
mod validation;

pub use const_prop::{ConstantPropagation, constant_propagate};
pub use cse::{CommonSubexprElimination, eliminate_common_subexpressions};
pub use dce::{DeadLetElimination, eliminate_dead_code};
pub use validation::validate;

use std::fmt::Debug;

use arblang_ir::Program;

/// An optimisation pass that transforms an IR program.
pub trait Pass: Debug {
    /// Human-readable name of the pass.
    fn name(&self) -> &str;

    /// Run one round of the pass. Returns `true` if anything was modified.
    fn run(&self, program: &mut Program) -> bool;
}

/// Optimisation level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptLevel {
    /// No optimisations.
    O0,
    /// Constant propagation, dead-let elimination, CSE.
    O1,
    /// Aggressive optimisations (same as O1 for now).
    O2,
}

/// Maximum number of fixed-point iterations before giving up.
const MAX_ITERATIONS: usize = 10;

/// Runs passes in sequence with fixed-point iteration.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    /// Creates an empty pass manager with no passes.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Creates a pass manager with passes appropriate for the given level.
    pub fn for_level(level: OptLevel) -> Self {
        let mut pm = Self::new();
        match level {
            OptLevel::O0 => {}
            OptLevel::O1 | OptLevel::O2 => {
                pm.add_pass(Box::new(ConstantPropagation));
                pm.add_pass(Box::new(DeadLetElimination));
                pm.add_pass(Box::new(CommonSubexprElimination));
                pm.add_pass(Box::new(DeadLetElimination));
            }
        }
        pm
    }

    /// Adds a pass to the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Runs all passes until a fixed point is reached or the iteration limit.
    pub fn run(&self, program: &mut Program) {
        for iteration in 0..MAX_ITERATIONS {
            let mut changed = false;
            for pass in &self.passes {
                let pass_changed = pass.run(program);
                if pass_changed {
                    log::debug!("{} changed the program (iteration {iteration})", pass.name());
                }
                changed |= pass_changed;
            }
            if !changed {
                break;
            }
        }
    }
}

/// Convenience function: runs the O1 pipeline on a program.
pub fn optimize(program: &mut Program) {
    PassManager::for_level(OptLevel::O1).run(program);
}
