//! Operators. Each module holds an operator struct, the observer it puts in
//! front of the downstream observer, and its tests.

/// Forwards the terminal methods and `is_finished` to the named field.
macro_rules! forward_terminal {
  ($field:ident) => {
    #[inline]
    fn error(self, err: Err) { self.$field.error(err) }

    #[inline]
    fn complete(self) { self.$field.complete() }

    #[inline]
    fn is_finished(&self) -> bool { self.$field.is_finished() }
  };
}

pub mod all_any;
pub mod buffer;
pub mod collect;
pub mod delay;
pub mod distinct;
pub mod filter;
pub mod first_with_signal;
pub mod flat_map;
pub mod log;
pub mod map;
pub mod merge;
pub mod skip;
pub mod subscribe_on;
pub mod take;
pub mod tap;
pub mod zip;
