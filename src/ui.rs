use crate::app::App;
use crate::raster::{Raster, TextOverlay, HALF_BLOCK};
use crate::scene::LayerId;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Population density ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(MapWidget { raster: app.raster() }, inner);

    let tooltip = app.map.tooltip();
    if tooltip.visible {
        let lines: Vec<Line> = std::iter::once(Line::from(Span::styled(
            tooltip.content.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .chain(tooltip.content.lines.iter().map(|l| Line::from(l.clone())))
        .collect();
        let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 2;
        let height = lines.len() as u16 + 2;

        // Tooltip position is in map pixels; rows hold two pixels each
        let col = inner.x.saturating_add(tooltip.position.x.max(0.0) as u16);
        let row = inner.y.saturating_add((tooltip.position.y.max(0.0) / 2.0) as u16);
        let popup = place_popup(inner, col, row, width, height);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Gray)),
            ),
            popup,
        );
    }
}

/// Keep a `width` x `height` popup anchored at (col, row) inside `area`.
/// Flips to the other side of the anchor when it would overflow.
pub fn place_popup(area: Rect, col: u16, row: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let right = area.x + area.width;
    let bottom = area.y + area.height;

    let x = if col.saturating_add(width) <= right {
        col
    } else {
        col.saturating_sub(width).max(area.x)
    };
    let y = if row.saturating_add(height) <= bottom {
        row
    } else {
        row.saturating_sub(height).max(area.y)
    };
    Rect::new(x, y, width, height)
}

/// Half-block map with text overlays
struct MapWidget<'a> {
    raster: &'a Raster,
}

impl MapWidget<'_> {
    fn text_style(text: &TextOverlay) -> Style {
        match text.layer {
            LayerId::Labels => Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::Black),
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let canvas = &self.raster.canvas;
        let rows = canvas.rows().min(area.height as usize);
        let cols = canvas.cols().min(area.width as usize);

        for row in 0..rows {
            let y = area.y + row as u16;
            for col in 0..cols {
                let Some((top, bottom)) = canvas.cell(col, row) else {
                    continue;
                };
                let x = area.x + col as u16;
                buf[(x, y)]
                    .set_char(HALF_BLOCK)
                    .set_fg(top.into())
                    .set_bg(bottom.into());
            }
        }

        // Overlay labels; text sits on the cell's lower pixel color
        for text in &self.raster.texts {
            let Ok(row) = u16::try_from(text.row) else {
                continue;
            };
            let start = i64::from(text.col);
            if row >= area.height {
                continue;
            }
            let y = area.y + row;
            let style = Self::text_style(text);

            for (i, ch) in text.content.chars().enumerate() {
                let col = start + i as i64;
                if col < 0 || col >= i64::from(area.width) {
                    continue;
                }
                let background = canvas
                    .cell(col as usize, row as usize)
                    .map_or(Color::Reset, |(_, bottom)| bottom.into());
                buf[(area.x + col as u16, y)]
                    .set_char(ch)
                    .set_style(style.bg(background));
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let scene = app.map.scene();

    let status = Line::from(vec![
        Span::styled(" Hover: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.hover_label(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} countries ", app.map.countries().len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} cities ", app.map.cities().len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} nodes ", scene.node_count()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("render #{}", app.renders),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            " | r:re-render q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_stays_inside() {
        let area = Rect::new(1, 1, 40, 20);
        assert_eq!(place_popup(area, 5, 5, 10, 4), Rect::new(5, 5, 10, 4));
        assert_eq!(place_popup(area, 38, 5, 10, 4), Rect::new(28, 5, 10, 4));
        assert_eq!(place_popup(area, 5, 19, 10, 4), Rect::new(5, 15, 10, 4));
        assert_eq!(place_popup(area, 5, 5, 80, 4).width, 40);
    }
}
