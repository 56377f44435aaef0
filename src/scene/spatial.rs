use crate::scene::LayerId;
use glam::DVec2;
use std::collections::HashMap;

/// Uniform grid over screen space for pointer hit testing.
/// Each element's bounding box is indexed into every cell it overlaps,
/// so a query never misses an element (false positives are removed by the
/// exact shape test in `Scene::pick`). Bounds are clipped to `area`, the
/// part of the plane a pointer can reach.
#[derive(Debug)]
pub struct PickGrid {
    cells: HashMap<(i32, i32), Vec<(LayerId, usize)>>,
    cell_size: f64,
    area: (DVec2, DVec2),
}

impl PickGrid {
    pub fn new(cell_size: f64, area: (DVec2, DVec2)) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
            area,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Index an entry into every cell its bounds overlap
    pub fn insert(&mut self, (min, max): (DVec2, DVec2), entry: (LayerId, usize)) {
        if !min.is_finite() || !max.is_finite() {
            return;
        }
        let (min, max) = (min.max(self.area.0), max.min(self.area.1));
        if min.x > max.x || min.y > max.y {
            return;
        }
        let min_cell = self.to_cell(min);
        let max_cell = self.to_cell(max);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                self.cells.entry((x, y)).or_default().push(entry);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Entries whose bounds may contain `p`
    pub fn query(&self, p: DVec2) -> impl Iterator<Item = (LayerId, usize)> + '_ {
        self.cells
            .get(&self.to_cell(p))
            .into_iter()
            .flat_map(|entries| entries.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> PickGrid {
        PickGrid::new(10.0, (DVec2::ZERO, DVec2::splat(100.0)))
    }

    #[test]
    fn test_insert_spans_cells() {
        let mut grid = grid();
        grid.insert((DVec2::new(5.0, 5.0), DVec2::new(25.0, 5.0)), (LayerId::Countries, 3));
        for x in [5.0, 15.0, 25.0] {
            let hits: Vec<_> = grid.query(DVec2::new(x, 5.0)).collect();
            assert_eq!(hits, vec![(LayerId::Countries, 3)]);
        }
        assert_eq!(grid.query(DVec2::new(35.0, 5.0)).count(), 0);
    }

    #[test]
    fn test_non_finite_bounds_skipped() {
        let mut grid = grid();
        grid.insert((DVec2::splat(f64::NAN), DVec2::ZERO), (LayerId::Symbols, 0));
        assert_eq!(grid.query(DVec2::ZERO).count(), 0);
    }

    #[test]
    fn test_bounds_clipped_to_area() {
        let mut grid = grid();
        grid.insert((DVec2::splat(-1e9), DVec2::splat(1e9)), (LayerId::Symbols, 0));
        assert_eq!(grid.cell_count(), 100);
        assert_eq!(grid.query(DVec2::new(55.0, 55.0)).count(), 1);

        grid.insert((DVec2::splat(200.0), DVec2::splat(300.0)), (LayerId::Symbols, 1));
        assert_eq!(grid.cell_count(), 100);
    }
}
