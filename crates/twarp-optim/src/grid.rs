//! Coarse grids over the segment and slack ranges.

/// Maximum number of grid values per axis.
pub const MAX_GRID_POINTS: usize = 5;

/// At most five evenly spaced integers covering `min..=max`, ascending and unique.
///
/// Ranges of five values or fewer are returned whole. Longer ranges keep both
/// ends plus the three quartile points, rounded half-to-even.
#[must_use]
pub fn coarse_grid(min: i64, max: i64) -> Vec<i64> {
    if max - min + 1 <= MAX_GRID_POINTS as i64 {
        return (min..=max).collect();
    }
    let step = (max - min) as f64 / 4.0;
    let mut grid: Vec<i64> = (0..MAX_GRID_POINTS)
        .map(|k| match k {
            0 => min,
            4 => max,
            _ => (min as f64 + step * k as f64).round_ties_even() as i64,
        })
        .collect();
    grid.sort_unstable();
    grid.dedup();
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_range_returned_whole() {
        assert_eq!(coarse_grid(1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(coarse_grid(3, 3), vec![3]);
    }

    #[test]
    fn long_range_rounds_half_to_even() {
        // step 2.5: 7.5 -> 8, 12.5 -> 12
        assert_eq!(coarse_grid(5, 15), vec![5, 8, 10, 12, 15]);
    }

    #[test]
    fn quartiles_of_wide_range() {
        // step 6.25: 11.25, 17.5, 23.75
        assert_eq!(coarse_grid(5, 30), vec![5, 11, 18, 24, 30]);
    }

    #[test]
    fn six_values_keep_five() {
        // step 1.25: 2.25, 3.5, 4.75
        assert_eq!(coarse_grid(1, 6), vec![1, 2, 4, 5, 6]);
    }
}
