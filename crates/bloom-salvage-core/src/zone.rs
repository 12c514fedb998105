//! Containment queries against concentric alert rings around a fixed point.

use crate::grid::{Cell, PresenceMask};
use crate::spatial::OccupancyIndex;

/// True iff `point` lies within `radius` cells of `center` (boundary inclusive).
pub fn contains(point: Cell, center: Cell, radius: f64) -> bool {
    radius >= 0.0 && point.distance_sq(center) as f64 <= radius * radius
}

/// Occupied cells of `mask` within `radius` of `center`, in row-major order.
pub fn points_in_zone(mask: &PresenceMask, center: Cell, radius: f64) -> Vec<Cell> {
    ZoneMonitor::new(mask).points_in_zone(center, radius)
}

/// Occupied cells inside `outer` but not inside `inner`, in row-major order.
pub fn points_in_annulus(mask: &PresenceMask, center: Cell, outer: f64, inner: f64) -> Vec<Cell> {
    ZoneMonitor::new(mask).points_in_annulus(center, outer, inner)
}

/// Zone queries over one mask snapshot, sharing a single spatial index.
pub struct ZoneMonitor {
    index: OccupancyIndex,
}

impl ZoneMonitor {
    pub fn new(mask: &PresenceMask) -> Self {
        Self {
            index: OccupancyIndex::from_mask(mask),
        }
    }

    pub fn points_in_zone(&self, center: Cell, radius: f64) -> Vec<Cell> {
        self.index.within(center, radius)
    }

    /// Same candidates as `points_in_zone`, nearest to `center` first.
    pub fn points_by_distance(&self, center: Cell, radius: f64) -> Vec<Cell> {
        self.index.nearest_within(center, radius)
    }

    pub fn points_in_annulus(&self, center: Cell, outer: f64, inner: f64) -> Vec<Cell> {
        self.index
            .within(center, outer)
            .into_iter()
            .filter(|&p| !contains(p, center, inner))
            .collect()
    }

    pub fn any_in_zone(&self, center: Cell, radius: f64) -> bool {
        self.index.count_within(center, radius) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_includes_boundary() {
        let c = Cell::new(758, 498);
        assert!(contains(Cell::new(768, 498), c, 10.0));
        assert!(!contains(Cell::new(769, 498), c, 10.0));
        assert!(contains(Cell::new(764, 506), c, 10.0)); // 6-8-10
    }

    #[test]
    fn annulus_excludes_inner_ring() {
        let center = Cell::new(50, 50);
        let mask = PresenceMask::from_cells(
            100,
            100,
            [Cell::new(52, 50), Cell::new(65, 50), Cell::new(50, 71), Cell::new(50, 60)],
        )
        .unwrap();
        let ring = points_in_annulus(&mask, center, 20.0, 10.0);
        assert_eq!(ring, vec![Cell::new(65, 50)]);
        let inner = points_in_zone(&mask, center, 10.0);
        assert_eq!(inner, vec![Cell::new(52, 50), Cell::new(50, 60)]);
    }

    #[test]
    fn empty_mask_has_no_zone_points() {
        let mask = PresenceMask::new(10, 10).unwrap();
        let monitor = ZoneMonitor::new(&mask);
        assert!(!monitor.any_in_zone(Cell::new(5, 5), 100.0));
        assert!(monitor.points_in_annulus(Cell::new(5, 5), 8.0, 2.0).is_empty());
    }
}
