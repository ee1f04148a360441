//! Stack growth for the matcher engine.
//!
//! Matcher instances recurse once per nested node: a sequence builds its
//! children, a quantifier builds one instance per repetition, and a macro
//! call builds the callee. Grammars such as JSON arrays nested a few
//! thousand levels deep would exhaust a default thread stack, so every
//! recursive step of the engine goes through [`ensure_sufficient_stack`].
//!
//! On native targets the stack is extended with `stacker` once less than
//! 100 KiB remain. On `wasm32` the closure is called directly.

/// Remaining stack below which a new segment is allocated.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if it is close to exhaustion.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f` directly; the wasm runtime manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
