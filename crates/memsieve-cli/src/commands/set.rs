//! Set command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::ValueEnum;
use memsieve::{CandidateSet, load_set, save_set};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetOp {
    Union,
    Intersect,
    Diff,
    Complement,
}

/// Run the set command
pub fn run(op: SetOp, inputs: &[PathBuf], output: &Path) -> Result<()> {
    let sets = inputs.iter().map(load_set).collect::<memsieve::Result<Vec<_>>>()?;
    let result = combine(op, &sets)?;
    save_set(output, &result)?;

    if result.is_complemented() {
        println!(
            "Result: all addresses except {} (saved to {})",
            result.explicit().len(),
            output.display()
        );
    } else {
        println!(
            "Result: {} address(es) (saved to {})",
            result.explicit().len(),
            output.display()
        );
    }
    Ok(())
}

/// Apply `op` to the loaded sets
pub fn combine(op: SetOp, sets: &[CandidateSet]) -> Result<CandidateSet> {
    match (op, sets) {
        (SetOp::Complement, [a]) => Ok(a.complement()),
        (SetOp::Complement, _) => bail!("complement takes exactly one set"),
        (SetOp::Union, [a, b]) => Ok(a.union(b)),
        (SetOp::Intersect, [a, b]) => Ok(a.intersection(b)),
        (SetOp::Diff, [a, b]) => Ok(a.difference(b)),
        (op, _) => bail!("{:?} takes exactly two sets", op),
    }
}
