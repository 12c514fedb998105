use crate::grid::{Cell, PresenceMask};
use crate::zone::ZoneMonitor;

/// Clear up to `capacity` occupied cells within `radius` of `center`, nearest first.
///
/// Candidates are ordered by ascending distance with row-major index as the
/// tie-break, so exactly `min(capacity, candidates)` cells are removed and the
/// choice is reproducible. Returns the number of cells removed.
pub fn remove(mask: &mut PresenceMask, center: Cell, radius: f64, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let candidates = ZoneMonitor::new(mask).points_by_distance(center, radius);
    let mut removed = 0;
    for cell in candidates.into_iter().take(capacity) {
        if mask.clear(cell) {
            removed += 1;
        }
    }
    removed
}

/// Clear every occupied cell within `radius` of `center`, regardless of capacity.
pub fn clear_zone(mask: &mut PresenceMask, center: Cell, radius: f64) -> usize {
    let zone = ZoneMonitor::new(mask).points_in_zone(center, radius);
    zone.into_iter().filter(|&cell| mask.clear(cell)).count()
}
