use crate::grid::{Cell, PresenceMask};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Occupied cell as stored in the R*-tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellLocation {
    pub cell: Cell,
    pub order: usize,
}

impl CellLocation {
    fn point(&self) -> [i64; 2] {
        [self.cell.x as i64, self.cell.y as i64]
    }
}

impl RTreeObject for CellLocation {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point())
    }
}

impl PointDistance for CellLocation {
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let p = self.point();
        let dx = p[0] - point[0];
        let dy = p[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Radius-query index over the occupied cells of one mask snapshot.
pub struct OccupancyIndex {
    tree: RTree<CellLocation>,
}

impl OccupancyIndex {
    /// Build via bulk_load (O(n log n)).
    pub fn from_mask(mask: &PresenceMask) -> Self {
        let width = mask.width();
        let locations: Vec<CellLocation> = mask
            .iter_occupied()
            .map(|cell| CellLocation {
                cell,
                order: cell.row_major_index(width),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(locations),
        }
    }

    /// Locations within `radius` cells of `center` (boundary inclusive), unordered.
    /// Uses AABB envelope query then filters by Euclidean distance.
    fn locate_within(&self, center: Cell, radius: f64) -> Vec<(u64, CellLocation)> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        // No two cells are further apart than u32::MAX per axis.
        let reach = radius.floor().min(u32::MAX as f64) as i64;
        let cx = center.x as i64;
        let cy = center.y as i64;
        let envelope = AABB::from_corners([cx - reach, cy - reach], [cx + reach, cy + reach]);
        let r_sq = radius * radius;

        self.tree
            .locate_in_envelope(&envelope)
            .filter_map(|loc| {
                let d2 = loc.cell.distance_sq(center);
                (d2 as f64 <= r_sq).then_some((d2, *loc))
            })
            .collect()
    }

    /// Occupied cells within `radius` of `center`, in row-major scan order.
    pub fn within(&self, center: Cell, radius: f64) -> Vec<Cell> {
        let mut hits = self.locate_within(center, radius);
        hits.sort_unstable_by_key(|(_, loc)| loc.order);
        hits.into_iter().map(|(_, loc)| loc.cell).collect()
    }

    /// Occupied cells within `radius` of `center`, nearest first.
    /// Equal distances fall back to row-major order so the result is total.
    pub fn nearest_within(&self, center: Cell, radius: f64) -> Vec<Cell> {
        let mut hits = self.locate_within(center, radius);
        hits.sort_unstable_by_key(|(d2, loc)| (*d2, loc.order));
        hits.into_iter().map(|(_, loc)| loc.cell).collect()
    }

    pub fn count_within(&self, center: Cell, radius: f64) -> usize {
        self.locate_within(center, radius).len()
    }
}
