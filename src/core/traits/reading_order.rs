//! Reading order policy seam.

use crate::domain::{LineRecord, ReadingDirection};
use std::sync::Arc;

/// A policy that arranges a page's lines into reading order.
///
/// Implementations must return a permutation of their input: every line
/// exactly once, nothing added. The pipeline rejects outputs whose length
/// differs from the input.
pub trait ReadingOrder: Send + Sync {
    /// Orders `lines` for the given horizontal reading direction.
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord>;

    /// Short policy name used in logs.
    fn name(&self) -> &str;
}

impl<T: ReadingOrder + ?Sized> ReadingOrder for &T {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        (**self).order(lines, direction)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: ReadingOrder + ?Sized> ReadingOrder for Box<T> {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        (**self).order(lines, direction)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: ReadingOrder + ?Sized> ReadingOrder for Arc<T> {
    fn order(&self, lines: Vec<LineRecord>, direction: ReadingDirection) -> Vec<LineRecord> {
        (**self).order(lines, direction)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
