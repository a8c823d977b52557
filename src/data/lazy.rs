use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::sync::Arc;

use ndarray::{ArrayD, ArrayViewD, Axis, Slice};

use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// AxisIndex – one entry of a numpy-style index expression
// ---------------------------------------------------------------------------

/// Selection along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisIndex {
    /// Pick one position and drop the axis. Negative values count from the end.
    Index(isize),
    /// Python-style slice; bounds are clamped, negatives count from the end.
    Range {
        start: Option<isize>,
        end: Option<isize>,
        step: usize,
    },
    /// Keep the whole axis.
    Full,
}

impl AxisIndex {
    pub fn range(start: isize, end: isize) -> Self {
        AxisIndex::Range {
            start: Some(start),
            end: Some(end),
            step: 1,
        }
    }

    pub fn stepped(start: Option<isize>, end: Option<isize>, step: usize) -> Self {
        AxisIndex::Range { start, end, step }
    }
}

impl From<isize> for AxisIndex {
    fn from(i: isize) -> Self {
        AxisIndex::Index(i)
    }
}

impl From<usize> for AxisIndex {
    fn from(i: usize) -> Self {
        AxisIndex::Index(i as isize)
    }
}

impl From<i32> for AxisIndex {
    fn from(i: i32) -> Self {
        AxisIndex::Index(i as isize)
    }
}

impl From<Range<usize>> for AxisIndex {
    fn from(r: Range<usize>) -> Self {
        AxisIndex::range(r.start as isize, r.end as isize)
    }
}

impl From<RangeFrom<usize>> for AxisIndex {
    fn from(r: RangeFrom<usize>) -> Self {
        AxisIndex::stepped(Some(r.start as isize), None, 1)
    }
}

impl From<RangeTo<usize>> for AxisIndex {
    fn from(r: RangeTo<usize>) -> Self {
        AxisIndex::stepped(None, Some(r.end as isize), 1)
    }
}

impl From<RangeFull> for AxisIndex {
    fn from(_: RangeFull) -> Self {
        AxisIndex::Full
    }
}

/// Resolved selection for one axis of the *source* view at the time it is
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SliceOp {
    Index {
        axis: usize,
        index: usize,
    },
    Range {
        axis: usize,
        start: usize,
        end: usize,
        step: usize,
    },
}

/// Outcome of resolving an index expression against a shape, in the order
/// the ops must be applied (highest axis first so removals never shift the
/// axes still to be processed).
pub(crate) struct Resolved {
    pub ops: Vec<SliceOp>,
    pub shape: Vec<usize>,
}

fn normalize_bound(bound: isize, extent: usize) -> usize {
    let extent = extent as isize;
    let b = if bound < 0 { bound + extent } else { bound };
    b.clamp(0, extent) as usize
}

pub(crate) fn resolve(shape: &[usize], indices: &[AxisIndex]) -> Result<Resolved> {
    if indices.len() > shape.len() {
        return Err(DatasetError::TooManyIndices {
            rank: shape.len(),
            given: indices.len(),
        });
    }

    let mut ops = Vec::new();
    let mut out_shape = Vec::with_capacity(shape.len());
    for (axis, &extent) in shape.iter().enumerate().rev() {
        let index = indices.get(axis).copied().unwrap_or(AxisIndex::Full);
        match index {
            AxisIndex::Full => out_shape.push(extent),
            AxisIndex::Index(i) => {
                let resolved = if i < 0 { i + extent as isize } else { i };
                if resolved < 0 || resolved >= extent as isize {
                    return Err(DatasetError::IndexOutOfBounds {
                        index: i,
                        axis,
                        extent,
                    });
                }
                ops.push(SliceOp::Index {
                    axis,
                    index: resolved as usize,
                });
            }
            AxisIndex::Range { start, end, step } => {
                if step == 0 {
                    return Err(DatasetError::InvalidStep(step));
                }
                let start = start.map_or(0, |s| normalize_bound(s, extent));
                let end = end.map_or(extent, |e| normalize_bound(e, extent));
                let len = if end > start {
                    (end - start).div_ceil(step)
                } else {
                    0
                };
                let end = end.max(start);
                if !(start == 0 && end == extent && step == 1) {
                    ops.push(SliceOp::Range {
                        axis,
                        start,
                        end,
                        step,
                    });
                }
                out_shape.push(len);
            }
        }
    }
    out_shape.reverse();
    Ok(Resolved {
        ops,
        shape: out_shape,
    })
}

// ---------------------------------------------------------------------------
// LazyArray – shared buffer plus deferred selections
// ---------------------------------------------------------------------------

/// An n-dimensional `f64` array whose selections are recorded rather than
/// executed. The source buffer is shared between all selections taken from
/// it; nothing is copied until [`LazyArray::compute`].
#[derive(Clone)]
pub struct LazyArray {
    source: Arc<ArrayD<f64>>,
    ops: Vec<SliceOp>,
    shape: Vec<usize>,
}

impl LazyArray {
    pub fn new(array: ArrayD<f64>) -> Self {
        let shape = array.shape().to_vec();
        Self {
            source: Arc::new(array),
            ops: Vec::new(),
            shape,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements the computed array will hold.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of deferred operations.
    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    pub(crate) fn select_resolved(&self, resolved: Resolved) -> Self {
        let mut ops = self.ops.clone();
        ops.extend(resolved.ops);
        Self {
            source: Arc::clone(&self.source),
            ops,
            shape: resolved.shape,
        }
    }

    /// Record a selection without touching the data.
    pub fn select(&self, indices: &[AxisIndex]) -> Result<Self> {
        let resolved = resolve(&self.shape, indices)?;
        Ok(self.select_resolved(resolved))
    }

    fn view(&self) -> ArrayViewD<'_, f64> {
        let mut view = self.source.view();
        for op in &self.ops {
            match *op {
                SliceOp::Index { axis, index } => {
                    view = view.index_axis_move(Axis(axis), index);
                }
                SliceOp::Range {
                    axis,
                    start,
                    end,
                    step,
                } => {
                    view.slice_axis_inplace(
                        Axis(axis),
                        Slice::new(start as isize, Some(end as isize), step as isize),
                    );
                }
            }
        }
        view
    }

    /// Materialize the selection into an owned array.
    pub fn compute(&self) -> ArrayD<f64> {
        log::debug!(
            "computing lazy array of shape {:?} ({} pending ops)",
            self.shape,
            self.ops.len()
        );
        self.view().to_owned()
    }

    /// Row-major copy of the selected values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.view().iter().copied().collect()
    }
}

impl fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyArray<f64, shape={:?}, pending={}>", self.shape, self.ops.len())
    }
}
