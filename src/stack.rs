//! Stack growth for the recursive parser and evaluator.
//!
//! Deeply nested source (`((((1))))`, long `!!!!x` chains) and deep script
//! recursion both map onto native recursion. Wrapping each recursive entry
//! point in [`ensure_sufficient_stack`] moves the work onto a fresh segment
//! when the current one runs low, so the call-depth bound in
//! `InterpreterConfig` is what stops a runaway script, not a native overflow.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
