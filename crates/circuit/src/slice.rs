// This code is part of Qiskit.
//
// (C) Copyright IBM 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use thiserror::Error;

use self::sealed::SequenceIndexIter;

/// A Python-style slice with optional `start`, `stop` and `step`.
///
/// Negative `start` and `stop` count from the end of the sequence, and a negative `step` walks
/// backwards.  Use [SliceIndex::indices] or [SequenceKey::with_len] to resolve it against a
/// collection of a known length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceIndex {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl SliceIndex {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    /// The slice `[:]`, selecting every element.
    pub fn full() -> Self {
        Self::default()
    }

    /// The slice `[start:stop]`.
    pub fn range(start: isize, stop: isize) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// Resolve this slice against a sequence of length `len`, returning the normalised
    /// `(start, stop, step)` triple with the same semantics as Python's `slice.indices`.
    ///
    /// `start` and `stop` are clamped into `-1..=len`; `-1` only appears for negative steps, where
    /// it means "run off the front of the sequence".
    pub fn indices(&self, len: usize) -> Result<(isize, isize, isize), SequenceIndexError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(SequenceIndexError::ZeroStep);
        }
        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(value) if value < 0 => (value + len).max(lower),
            Some(value) => value.min(upper),
        };
        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });
        Ok((start, stop, step))
    }
}

/// An indexer for a sequence; a single integer or a slice.
///
/// Integer indices may be negative, as in Python.  Use `with_len` to specialize the index to a
/// valid Rust-space indexer into a collection of the given length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceKey {
    Int(isize),
    Slice(SliceIndex),
}

impl From<isize> for SequenceKey {
    fn from(value: isize) -> Self {
        Self::Int(value)
    }
}

impl From<SliceIndex> for SequenceKey {
    fn from(value: SliceIndex) -> Self {
        Self::Slice(value)
    }
}

impl SequenceKey {
    /// Specialize this index to a collection of the given `len`, returning a Rust-native type.
    pub fn with_len(&self, len: usize) -> Result<SequenceIndex, SequenceIndexError> {
        match self {
            SequenceKey::Int(index) => {
                let wrapped_index = SequenceKey::convert_idx(*index, len)?;
                Ok(SequenceIndex::Int(wrapped_index))
            }
            SequenceKey::Slice(slice) => {
                let (start, stop, step) = slice.indices(len)?;
                if step > 0 {
                    Ok(SequenceIndex::PosRange {
                        start: start as usize,
                        stop: stop as usize,
                        step: step as usize,
                    })
                } else {
                    Ok(SequenceIndex::NegRange {
                        // `start` can be negative if the collection length is 0.
                        start: (start >= 0).then_some(start as usize),
                        // `stop` can be negative if the 0 index should be output.
                        stop: (stop >= 0).then_some(stop as usize),
                        step: step.unsigned_abs(),
                    })
                }
            }
        }
    }

    /// Given an integer (which may be negative) get a valid unsigned index for a sequence.
    pub fn convert_idx(index: isize, length: usize) -> Result<usize, SequenceIndexError> {
        let wrapped_index = if index >= 0 {
            let index = index as usize;
            if index >= length {
                return Err(SequenceIndexError::OutOfRange);
            }
            index
        } else {
            length
                .checked_sub(index.unsigned_abs())
                .ok_or(SequenceIndexError::OutOfRange)?
        };
        Ok(wrapped_index)
    }
}

/// Error type for problems encountered when resolving a `SequenceKey`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceIndexError {
    #[error("index out of range")]
    OutOfRange,
    #[error("slice step cannot be zero")]
    ZeroStep,
}

/// Rust-native version of a Python sequence-like indexer.
///
/// Typically this is constructed by a call to `SequenceKey::with_len`, which guarantees that
/// all the indices will be in bounds for a collection of the given length.
///
/// This splits the positive- and negative-step versions of the slice in two so it can be translated
/// more easily into static dispatch.  This type can be converted into several types of iterator.
#[derive(Clone, Copy, Debug)]
pub enum SequenceIndex {
    Int(usize),
    PosRange {
        start: usize,
        stop: usize,
        step: usize,
    },
    NegRange {
        start: Option<usize>,
        stop: Option<usize>,
        step: usize,
    },
}

impl SequenceIndex {
    /// The number of indices this refers to.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(_) => 1,
            Self::PosRange { start, stop, step } => {
                let gap = stop.saturating_sub(*start);
                gap / *step + (gap % *step != 0) as usize
            }
            Self::NegRange { start, stop, step } => 'arm: {
                let Some(start) = start else { break 'arm 0 };
                let gap = stop
                    .map(|stop| start.saturating_sub(stop))
                    .unwrap_or(*start + 1);
                gap / step + (gap % step != 0) as usize
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        // This is just to keep clippy happy; the length is already fairly inexpensive to calculate.
        self.len() == 0
    }

    /// Get an iterator over the indices.  This will be a single-item iterator for the case of
    /// `Self::Int`, but you probably wanted to destructure off that case beforehand anyway.
    pub fn iter(&self) -> SequenceIndexIter {
        match self {
            Self::Int(value) => SequenceIndexIter::Int(Some(*value)),
            Self::PosRange { start, step, .. } => SequenceIndexIter::PosRange {
                lowest: *start,
                step: *step,
                indices: 0..self.len(),
            },
            Self::NegRange { start, step, .. } => SequenceIndexIter::NegRange {
                // We can unwrap `highest` to an arbitrary value if `None`, because in that case the
                // `len` is 0 and the iterator will not yield any objects.
                highest: start.unwrap_or_default(),
                step: *step,
                indices: 0..self.len(),
            },
        }
    }
}

impl IntoIterator for SequenceIndex {
    type Item = usize;
    type IntoIter = SequenceIndexIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Private module to make it impossible to construct or inspect the internals of the iterator types
// from outside this file, while still allowing them to be used.
mod sealed {
    /// Custom iterator for indices for sequence-likes.
    ///
    /// In the range types, the `indices ` are `Range` objects that run from 0 to the length of the
    /// iterator.  In theory, we could generate the iterators ourselves, but that ends up with a lot of
    /// boilerplate.
    #[derive(Clone, Debug)]
    pub enum SequenceIndexIter {
        Int(Option<usize>),
        PosRange {
            lowest: usize,
            step: usize,
            indices: ::std::ops::Range<usize>,
        },
        NegRange {
            highest: usize,
            // The step of the iterator, but note that this is a negative range, so the forwards method
            // steps downwards from `upper` towards `lower`.
            step: usize,
            indices: ::std::ops::Range<usize>,
        },
    }
    impl Iterator for SequenceIndexIter {
        type Item = usize;

        #[inline]
        fn next(&mut self) -> Option<Self::Item> {
            match self {
                Self::Int(value) => value.take(),
                Self::PosRange {
                    lowest,
                    step,
                    indices,
                } => indices.next().map(|idx| *lowest + idx * *step),
                Self::NegRange {
                    highest,
                    step,
                    indices,
                } => indices.next().map(|idx| *highest - idx * *step),
            }
        }

        #[inline]
        fn size_hint(&self) -> (usize, Option<usize>) {
            match self {
                Self::Int(None) => (0, Some(0)),
                Self::Int(Some(_)) => (1, Some(1)),
                Self::PosRange { indices, .. } | Self::NegRange { indices, .. } => {
                    indices.size_hint()
                }
            }
        }
    }
    impl DoubleEndedIterator for SequenceIndexIter {
        #[inline]
        fn next_back(&mut self) -> Option<Self::Item> {
            match self {
                Self::Int(value) => value.take(),
                Self::PosRange {
                    lowest,
                    step,
                    indices,
                } => indices.next_back().map(|idx| *lowest + idx * *step),
                Self::NegRange {
                    highest,
                    step,
                    indices,
                } => indices.next_back().map(|idx| *highest - idx * *step),
            }
        }
    }
    impl ExactSizeIterator for SequenceIndexIter {}
}
