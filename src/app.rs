use crate::map::{ChoroplethMap, PointerEvent};
use crate::raster::{rasterize, Raster};
use crate::scene::Target;
use glam::DVec2;
use tracing::{debug, warn};

/// Application state
pub struct App {
    pub map: ChoroplethMap,
    pub should_quit: bool,
    /// Element under the mouse, if any
    pub hovered: Option<Target>,
    /// Current mouse position (terminal column/row)
    pub mouse_pos: Option<(u16, u16)>,
    /// Map area in characters, inside the border
    map_cols: u16,
    map_rows: u16,
    raster: Raster,
    /// Completed render cycles, for the status bar
    pub renders: u64,
}

/// Map area inside the border (2 chars horizontal, 2 vertical plus the status bar)
pub fn map_size(width: u16, height: u16) -> (u16, u16) {
    (width.saturating_sub(2), height.saturating_sub(3))
}

impl App {
    pub fn new(map: ChoroplethMap, width: u16, height: u16) -> Self {
        let (map_cols, map_rows) = map_size(width, height);
        let raster = rasterize(map.scene(), map_cols as usize, map_rows as usize);
        let mut app = Self {
            map,
            should_quit: false,
            hovered: None,
            mouse_pos: None,
            map_cols: 0,
            map_rows: 0,
            raster,
            renders: 0,
        };
        app.resize(width, height);
        app
    }

    /// Terminal resized: refit the map to the new pixel grid
    pub fn resize(&mut self, width: u16, height: u16) {
        let (cols, rows) = map_size(width, height);
        if (cols, rows) == (self.map_cols, self.map_rows) {
            return;
        }
        // Each cell is one pixel wide and two tall
        match self.map.resize(f64::from(cols), f64::from(rows) * 2.0) {
            Ok(()) => {
                self.map_cols = cols;
                self.map_rows = rows;
                self.refresh();
            }
            Err(e) => warn!(cols, rows, "terminal too small for the map: {e}"),
        }
    }

    /// Re-run the render cycle on unchanged data
    pub fn rerender(&mut self) {
        self.map.update();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.raster = rasterize(self.map.scene(), self.map_cols as usize, self.map_rows as usize);
        self.renders += 1;
        self.hovered = self.hovered.filter(|t| self.map.target_name(*t).is_some());
        debug!(renders = self.renders, texts = self.raster.texts.len(), "rasterized scene");
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Convert terminal coords to map pixel coords (cell center).
    /// Account for border (1 cell offset)
    pub fn pixel_at(&self, col: u16, row: u16) -> Option<DVec2> {
        let (x, y) = (col.checked_sub(1)?, row.checked_sub(1)?);
        (x < self.map_cols && y < self.map_rows)
            .then(|| DVec2::new(f64::from(x) + 0.5, f64::from(y) * 2.0 + 1.0))
    }

    /// Track the mouse: leave the previous element, then move over the new one
    pub fn mouse_moved(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let page = self.pixel_at(col, row);
        let target = page.and_then(|p| self.map.target_at(p));

        if let Some(prev) = self.hovered {
            if Some(prev) != target {
                self.map.dispatch(PointerEvent::Leave { target: prev });
            }
        }
        if let (Some(target), Some(page)) = (target, page) {
            self.map.dispatch(PointerEvent::Move { target, page });
        }
        self.hovered = target;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Name of the hovered country or city
    pub fn hover_label(&self) -> String {
        match self.hovered {
            Some(target) => self.map.target_name(target).unwrap_or_default().to_string(),
            None => "-".to_string(),
        }
    }
}
