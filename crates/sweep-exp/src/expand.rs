use std::iter::FusedIterator;

use sweep_core::errors::{ErrorInfo, SweepError};
use sweep_core::{Combination, ParameterSpec, Scalar};

/// Lazy cartesian product over the axes of a [`ParameterSpec`].
///
/// Combinations are produced in lexicographic product order: keys keep their
/// declaration order and the last declared key varies fastest. Only the
/// combination being yielded is materialised, so the memory footprint does
/// not depend on the size of the sweep. Cloning the iterator restarts from
/// the clone's current position.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    axes: Vec<(&'a str, &'a [Scalar])>,
    position: usize,
    total: usize,
}

impl<'a> Combinations<'a> {
    fn new(spec: &'a ParameterSpec) -> Result<Self, SweepError> {
        if spec.is_empty() {
            return Err(SweepError::invalid(
                "spec-empty",
                "specification declares no parameters",
            ));
        }
        let total = spec.combination_count()?;
        let axes = spec
            .iter()
            .map(|(key, value)| (key, value.values()))
            .collect();
        Ok(Self {
            axes,
            position: 0,
            total,
        })
    }

    /// Total number of combinations in the sweep, independent of progress.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Index of the combination the next call to `next` will yield.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Decodes `index` as a mixed-radix number whose last digit belongs to
    /// the last axis.
    fn decode(&self, index: usize) -> Combination {
        let mut digits = vec![0usize; self.axes.len()];
        let mut rest = index;
        for (slot, (_, values)) in digits.iter_mut().zip(&self.axes).rev() {
            *slot = rest % values.len();
            rest /= values.len();
        }
        let mut combination = Combination::with_capacity(self.axes.len());
        for ((key, values), digit) in self.axes.iter().zip(digits) {
            combination.insert(*key, values[digit].clone());
        }
        combination
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total {
            return None;
        }
        let combination = self.decode(self.position);
        self.position += 1;
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.position;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.position = self.position.saturating_add(n).min(self.total);
        self.next()
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl FusedIterator for Combinations<'_> {}

/// Expands a specification into the lazy sequence of its combinations.
///
/// Scalar fields are held constant; every list field is varied
/// independently. The sequence length is the product of all axis lengths.
pub fn expand(spec: &ParameterSpec) -> Result<Combinations<'_>, SweepError> {
    Combinations::new(spec)
}

/// Returns the combination at `index` in [`expand`] order, or `None` when
/// the index is past the end of the sweep.
pub fn combination_at(spec: &ParameterSpec, index: usize) -> Result<Option<Combination>, SweepError> {
    let mut combinations = expand(spec)?;
    if index >= combinations.total() {
        return Ok(None);
    }
    Ok(combinations.nth(index))
}

/// Like [`combination_at`] but treats an out of range index as an error.
pub fn require_combination(spec: &ParameterSpec, index: usize) -> Result<Combination, SweepError> {
    let total = spec.combination_count()?;
    combination_at(spec, index)?.ok_or_else(|| {
        SweepError::InvalidSpecification(
            ErrorInfo::new("index-out-of-range", "combination index is past the end of the sweep")
                .with_context("index", index.to_string())
                .with_context("total", total.to_string()),
        )
    })
}
