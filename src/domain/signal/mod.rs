//! Signal engine: per-bar trading signals for each strategy variant.
//!
//! Both variants are pure functions of their input series and parameters.

pub mod calendar;
pub mod mean_reversion;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    Short,
    Flat,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Shift a series one period later; the first entry becomes undefined.
pub fn lag_one<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
        out.extend(values[..values.len() - 1].iter().copied().map(Some));
    }
    out
}
