//! Extracting the 1-D and 2-D slices a view draws from a materialized array.

use ndarray::{Array1, Array2, ArrayD, Axis, Ix1, Ix2};

use crate::error::{DatasetError, Result};

/// Reduce `data` to the axes in `keep` (in that order).
///
/// Axes listed in `fixed` are indexed at the given position; every other
/// axis not in `keep` is summed over.
pub fn reduce(data: &ArrayD<f64>, keep: &[usize], fixed: &[(usize, usize)]) -> Result<ArrayD<f64>> {
    let rank = data.ndim();
    for &axis in keep.iter().chain(fixed.iter().map(|(a, _)| a)) {
        if axis >= rank {
            return Err(DatasetError::AxisOutOfRange { axis, rank });
        }
    }

    // Original axis id of each axis of `current`.
    let mut remaining: Vec<usize> = (0..rank).collect();
    let mut current = data.clone();

    let mut fixed: Vec<(usize, usize)> = fixed
        .iter()
        .copied()
        .filter(|(axis, _)| !keep.contains(axis))
        .collect();
    fixed.sort_by(|a, b| b.0.cmp(&a.0));
    for (axis, index) in fixed {
        let extent = data.shape()[axis];
        if index >= extent {
            return Err(DatasetError::IndexOutOfBounds {
                index: index as isize,
                axis,
                extent,
            });
        }
        let Some(pos) = remaining.iter().position(|&a| a == axis) else {
            continue;
        };
        current = current.index_axis(Axis(pos), index).to_owned();
        remaining.remove(pos);
    }

    while let Some(pos) = remaining.iter().rposition(|a| !keep.contains(a)) {
        current = current.sum_axis(Axis(pos));
        remaining.remove(pos);
    }

    // Reorder to match `keep`.
    let order: Vec<usize> = keep
        .iter()
        .filter_map(|k| remaining.iter().position(|a| a == k))
        .collect();
    Ok(current.permuted_axes(order))
}

/// 2-D plane over `axes` (`[x, y]`), shaped `(len_x, len_y)`.
pub fn plane(data: &ArrayD<f64>, axes: [usize; 2], fixed: &[(usize, usize)]) -> Result<Array2<f64>> {
    Ok(reduce(data, &axes, fixed)?.into_dimensionality::<Ix2>()?)
}

/// 1-D profile along `axis`.
pub fn line(data: &ArrayD<f64>, axis: usize, fixed: &[(usize, usize)]) -> Result<Array1<f64>> {
    Ok(reduce(data, &[axis], fixed)?.into_dimensionality::<Ix1>()?)
}
