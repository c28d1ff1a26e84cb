/*
MIT License with diffpy.srreal Attribution

Copyright (c) 2026 srreal-rs contributors

Based on or developed using diffpy.srreal
Copyright (c) 2009 Trustees of the Columbia University
in the City of New York. All rights reserved.
*/

//! Abstract pair-quantity accumulator and its evaluation drivers
//!
//! A [`PairQuantity`] owns an output array and a per-bond contribution
//! hook; the drivers in this module wire it to a bond generator. The
//! hook is the customization point: the PDF calculators implement it
//! with their physics, and [`CustomPairQuantity`] accepts an injected
//! closure so callers can define new pair sums without a new type.
//!
//! Evaluation is atomic. Any failure — a malformed structure, a
//! numeric error in a contribution, a raised abort signal — resets the
//! accumulator and surfaces the error; a partially accumulated value
//! is never observable.

mod grid;

pub use grid::Grid;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use ndarray::{s, Array1, ArrayView1};
use rayon::prelude::*;

use crate::bonds::{Bond, BondGenerator};
use crate::errors::{Error, Result};
use crate::structure::StructureAdapter;

/// Shared flag for cooperative cancellation of a running evaluation.
///
/// Raise it from another thread with `signal.store(true, SeqCst)`;
/// the evaluation loop checks it between bonds.
pub type AbortSignal = Arc<AtomicBool>;

/// Evaluation options shared by all calculators
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Number of worker threads; 0 or 1 selects the serial path
    pub workers: usize,
    /// Optional cancellation flag
    pub abort: Option<AbortSignal>,
}

impl EvalOptions {
    /// Serial evaluation with no abort signal
    pub fn serial() -> Self {
        Self::default()
    }

    /// Parallel evaluation over the given number of workers
    pub fn parallel(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Attach an abort signal
    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = Some(abort);
        self
    }

    fn aborted(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// An accumulator of per-bond contributions.
///
/// Implementors own an `Array1<f64>` value array and define what one
/// bond adds to it. The provided `reset_value`/`resize_value` methods
/// give the default grow-without-discarding semantics; quantities with
/// a fixed-size accumulator (for example per-site sums) may override
/// them.
pub trait PairQuantity: Send + Sync {
    /// The accumulated value array
    fn value(&self) -> ArrayView1<'_, f64>;

    /// Mutable access to the accumulator, used by the drivers for
    /// resets and partial-result merging
    fn value_mut(&mut self) -> &mut Array1<f64>;

    /// Bond distance range (rmin, rmax) used to configure the bond
    /// generator for this quantity
    fn bond_range(&self) -> (f64, f64);

    /// Add one bond's contribution to the accumulator.
    ///
    /// Called once per bond in a deterministic order; must not observe
    /// any state other than the bond, the structure and this
    /// quantity's own configuration.
    fn add_pair_contribution(
        &mut self,
        bond: &Bond,
        structure: &dyn StructureAdapter,
    ) -> Result<()>;

    /// Clear the accumulator to its empty state
    fn reset_value(&mut self) {
        self.value_mut().fill(0.0);
    }

    /// Grow the accumulator to `len` entries, preserving already
    /// accumulated values; shrinking is never performed mid-pass
    fn resize_value(&mut self, len: usize) {
        let current = self.value().len();
        if len <= current {
            return;
        }
        let mut grown = Array1::zeros(len);
        grown.slice_mut(s![..current]).assign(&self.value());
        *self.value_mut() = grown;
    }

    /// Hook invoked once after all bonds have contributed, before the
    /// result becomes visible; normalization lives here
    fn finish_value(&mut self, _structure: &dyn StructureAdapter) -> Result<()> {
        Ok(())
    }
}

/// Evaluate a pair quantity serially over one structure.
///
/// Re-running with identical inputs reproduces the result bit for bit:
/// the bond order is fixed and the summation order is the bond order.
pub fn evaluate<Q>(quantity: &mut Q, structure: &dyn StructureAdapter) -> Result<()>
where
    Q: PairQuantity + Clone,
{
    evaluate_with(quantity, structure, &EvalOptions::serial())
}

/// Evaluate a pair quantity with explicit options.
///
/// The parallel path partitions the bond sequence into contiguous
/// chunks, accumulates each chunk into a cloned private quantity, and
/// merges the partial accumulators by element-wise addition in
/// partition order. The merge never depends on worker completion
/// order, so parallel results are reproducible for a fixed worker
/// count and agree with the serial sum to floating-point summation
/// tolerance (reordering is documented, not eliminated).
pub fn evaluate_with<Q>(
    quantity: &mut Q,
    structure: &dyn StructureAdapter,
    options: &EvalOptions,
) -> Result<()>
where
    Q: PairQuantity + Clone,
{
    quantity.reset_value();
    let outcome = run_evaluation(quantity, structure, options);
    if let Err(error) = outcome {
        quantity.reset_value();
        return Err(error);
    }
    Ok(())
}

fn run_evaluation<Q>(
    quantity: &mut Q,
    structure: &dyn StructureAdapter,
    options: &EvalOptions,
) -> Result<()>
where
    Q: PairQuantity + Clone,
{
    let (rmin, rmax) = quantity.bond_range();
    let generator = BondGenerator::new(structure, rmin, rmax)?;

    if options.workers > 1 {
        run_parallel(quantity, structure, &generator, options)?;
    } else {
        run_serial(quantity, structure, &generator, options)?;
    }

    quantity.finish_value(structure)
}

fn run_serial<Q>(
    quantity: &mut Q,
    structure: &dyn StructureAdapter,
    generator: &BondGenerator<'_>,
    options: &EvalOptions,
) -> Result<()>
where
    Q: PairQuantity,
{
    let mut count = 0usize;
    for bond in generator.iter() {
        if options.aborted() {
            return Err(Error::Interrupted);
        }
        quantity.add_pair_contribution(&bond, structure)?;
        count += 1;
    }
    debug!("accumulated {} bonds serially", count);
    Ok(())
}

fn run_parallel<Q>(
    quantity: &mut Q,
    structure: &dyn StructureAdapter,
    generator: &BondGenerator<'_>,
    options: &EvalOptions,
) -> Result<()>
where
    Q: PairQuantity + Clone,
{
    let bonds = generator.generate_all();
    if bonds.is_empty() {
        return Ok(());
    }
    let chunk_size = bonds.len().div_ceil(options.workers).max(1);
    debug!(
        "accumulating {} bonds over {} workers, chunk size {}",
        bonds.len(),
        options.workers,
        chunk_size
    );

    let template: &Q = quantity;
    let partials: Vec<Result<Q>> = bonds
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut worker = template.clone();
            worker.reset_value();
            for bond in chunk {
                if options.aborted() {
                    return Err(Error::Interrupted);
                }
                worker.add_pair_contribution(bond, structure)?;
            }
            Ok(worker)
        })
        .collect();

    // merge in partition order; the first worker error wins
    for partial in partials {
        let partial = partial?;
        let partial_value = partial.value();
        let len = partial_value.len();
        quantity.resize_value(len);
        let value = quantity.value_mut();
        let mut target = value.slice_mut(s![..len]);
        target += &partial_value;
    }
    Ok(())
}

/// Type of an injected per-bond contribution function
pub type ContributionFn =
    dyn Fn(&mut Array1<f64>, &Bond, &dyn StructureAdapter) -> Result<()> + Send + Sync;

/// A pair quantity driven by an injected contribution closure.
///
/// This is the open end of the accumulation protocol: callers supply
/// a function with the same contract as the built-in contribution
/// hooks and get the full evaluation machinery — bond enumeration,
/// parallelism, cancellation, atomic failure — for free.
#[derive(Clone)]
pub struct CustomPairQuantity {
    value: Array1<f64>,
    initial_len: usize,
    rmin: f64,
    rmax: f64,
    contribution: Arc<ContributionFn>,
}

impl CustomPairQuantity {
    /// Create a quantity with the given bond range, initial
    /// accumulator length and contribution function
    pub fn new<F>(rmin: f64, rmax: f64, initial_len: usize, contribution: F) -> Self
    where
        F: Fn(&mut Array1<f64>, &Bond, &dyn StructureAdapter) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        Self {
            value: Array1::zeros(initial_len),
            initial_len,
            rmin,
            rmax,
            contribution: Arc::new(contribution),
        }
    }

    /// Evaluate over a structure and return a copy of the accumulated
    /// values
    pub fn eval(&mut self, structure: &dyn StructureAdapter) -> Result<Array1<f64>> {
        evaluate(self, structure)?;
        Ok(self.value.clone())
    }

    /// Evaluate with explicit options
    pub fn eval_with(
        &mut self,
        structure: &dyn StructureAdapter,
        options: &EvalOptions,
    ) -> Result<Array1<f64>> {
        evaluate_with(self, structure, options)?;
        Ok(self.value.clone())
    }
}

impl PairQuantity for CustomPairQuantity {
    fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    fn value_mut(&mut self) -> &mut Array1<f64> {
        &mut self.value
    }

    fn bond_range(&self) -> (f64, f64) {
        (self.rmin, self.rmax)
    }

    fn reset_value(&mut self) {
        if self.value.len() != self.initial_len {
            self.value = Array1::zeros(self.initial_len);
        } else {
            self.value.fill(0.0);
        }
    }

    fn add_pair_contribution(
        &mut self,
        bond: &Bond,
        structure: &dyn StructureAdapter,
    ) -> Result<()> {
        let contribution = Arc::clone(&self.contribution);
        contribution(&mut self.value, bond, structure)
    }
}
