use crate::grid::{Cell, DriftField, GridError, PresenceMask};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Transport every occupied cell of `mask` by its drift vector over `dt_hours`.
///
/// Panics if `field` and `mask` dimensions differ; use [`try_advect`] for the
/// checked variant.
pub fn advect(
    mask: &PresenceMask,
    field: &DriftField,
    dt_hours: f64,
    resolution_m: f64,
) -> PresenceMask {
    try_advect(mask, field, dt_hours, resolution_m).unwrap_or_else(|e| panic!("{e}"))
}

/// Displacement in cells is `v * dt_hours * 3600 / resolution`; the destination is
/// the rounded sum, clamped per axis into the grid (never wrapped). Sources that
/// land on the same cell merge, so the occupied count can only shrink.
pub fn try_advect(
    mask: &PresenceMask,
    field: &DriftField,
    dt_hours: f64,
    resolution_m: f64,
) -> Result<PresenceMask, GridError> {
    field.ensure_matches(mask)?;
    if !(resolution_m.is_finite() && resolution_m > 0.0) {
        return Err(GridError::InvalidResolution(resolution_m));
    }

    let scale = dt_hours * SECONDS_PER_HOUR / resolution_m;
    let max_x = (mask.width() - 1) as i64;
    let max_y = (mask.height() - 1) as i64;

    let mut next = mask.empty_like();
    for cell in mask.iter_occupied() {
        let [vx, vy] = field.get(cell);
        let x = (cell.x as f64 + vx * scale).round() as i64;
        let y = (cell.y as f64 + vy * scale).round() as i64;
        next.insert(Cell::new(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32));
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::synthetic_bloom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn empty_mask_stays_empty() {
        let mask = PresenceMask::new(20, 20).unwrap();
        let field = DriftField::uniform(20, 20, [3.0, -7.0]).unwrap();
        for dt in [0.0, 0.25, 1.0 / 3.0, 6.0] {
            assert!(advect(&mask, &field, dt, 50.0).is_empty());
        }
    }

    #[test]
    fn zero_field_is_identity() {
        let mask =
            PresenceMask::from_cells(16, 16, [Cell::new(0, 0), Cell::new(7, 3), Cell::new(15, 15)])
                .unwrap();
        let field = DriftField::zeros(16, 16).unwrap();
        assert_eq!(advect(&mask, &field, 1.0 / 3.0, 50.0), mask);
    }

    #[test]
    fn displacement_scales_with_time_and_resolution() {
        // 5 m/s * 1200 s / 50 m = 120 cells.
        let mask = PresenceMask::from_cells(1000, 1000, [Cell::new(770, 505)]).unwrap();
        let field = DriftField::uniform(1000, 1000, [5.0, 0.0]).unwrap();
        let moved = advect(&mask, &field, 20.0 / 60.0, 50.0);
        assert_eq!(moved.cells(), vec![Cell::new(890, 505)]);
    }

    #[test]
    fn destination_clamps_to_grid_bounds() {
        let mask =
            PresenceMask::from_cells(1000, 1000, [Cell::new(950, 505), Cell::new(20, 3)]).unwrap();
        let field = DriftField::uniform(1000, 1000, [5.0, -5.0]).unwrap();
        let moved = advect(&mask, &field, 20.0 / 60.0, 50.0);
        assert_eq!(moved.cells(), vec![Cell::new(140, 0), Cell::new(999, 385)]);
    }

    #[test]
    fn collisions_merge() {
        let mask = PresenceMask::from_cells(10, 1, [Cell::new(7, 0), Cell::new(8, 0), Cell::new(9, 0)])
            .unwrap();
        let field = DriftField::uniform(10, 1, [1.0, 0.0]).unwrap();
        let moved = advect(&mask, &field, 1.0, 3600.0);
        // 7 -> 8, 8 -> 9, 9 -> clamp 9
        assert_eq!(moved.occupied_count(), 2);
        assert_eq!(moved.cells(), vec![Cell::new(8, 0), Cell::new(9, 0)]);
    }

    #[test]
    fn random_fields_never_grow_the_bloom() {
        let (width, height) = (40, 30);
        for seed in 0..10 {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let mask = synthetic_bloom(width, height, Cell::new(20, 15), 12.0, 0.6, seed).unwrap();
            let velocity = (0..width * height)
                .map(|_| [rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0)])
                .collect();
            let field = DriftField::from_vec(width, height, velocity).unwrap();
            let mut current = mask.clone();
            for _ in 0..6 {
                let next = advect(&current, &field, 1.0 / 3.0, 50.0);
                assert!(
                    next.occupied_count() <= current.occupied_count(),
                    "seed {seed}: {} -> {}",
                    current.occupied_count(),
                    next.occupied_count()
                );
                current = next;
            }
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let mask = PresenceMask::from_cells(10, 10, [Cell::new(5, 5)]).unwrap();
        let field = DriftField::uniform(10, 10, [0.5, -0.5]).unwrap();
        let moved = advect(&mask, &field, 1.0, 3600.0);
        // 5.5 -> 6 and 4.5 -> 5
        assert_eq!(moved.cells(), vec![Cell::new(6, 5)]);
    }

    #[test]
    fn mismatched_field_is_rejected() {
        let mask = PresenceMask::new(10, 10).unwrap();
        let field = DriftField::zeros(11, 10).unwrap();
        assert!(matches!(
            try_advect(&mask, &field, 1.0, 50.0),
            Err(GridError::DimensionMismatch { .. })
        ));
    }
}
