use super::canvas::PixelCanvas;
use crate::color::Rgb;
use glam::DVec2;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut PixelCanvas, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Outline every ring, closing it back to its first vertex
pub fn stroke_rings(canvas: &mut PixelCanvas, rings: &[Vec<DVec2>], color: Rgb) {
    for ring in rings {
        let Some(&first) = ring.first() else {
            continue;
        };
        let mut prev = first;
        for &p in ring.iter().skip(1).chain(std::iter::once(&first)) {
            let (a, b) = (prev.floor().as_ivec2(), p.floor().as_ivec2());
            draw_line(canvas, a.x, a.y, b.x, b.y, color);
            prev = p;
        }
    }
}

/// Scanline fill with the even-odd rule across all rings. `plot` is called
/// for every pixel whose center lies inside; rows and columns are clipped
/// to `width` x `height`.
pub fn fill_rings<F>(rings: &[Vec<DVec2>], width: usize, height: usize, mut plot: F)
where
    F: FnMut(i32, i32),
{
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in rings.iter().flatten() {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let y_start = (min_y.floor() as i64).max(0);
    let y_end = (max_y.ceil() as i64).min(height as i64 - 1);
    let mut crossings: Vec<f64> = Vec::new();

    for y in y_start..=y_end {
        let yc = y as f64 + 0.5;
        crossings.clear();
        for ring in rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                if (a.y > yc) != (b.y > yc) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let x_start = ((span[0] - 0.5).ceil() as i64).max(0);
            let x_end = ((span[1] - 0.5).floor() as i64).min(width as i64 - 1);
            for x in x_start..=x_end {
                plot(x as i32, y as i32);
            }
        }
    }
}

/// Filled circle by pixel-center test, clipped to `width` x `height`; a
/// positive radius always covers at least the center pixel.
pub fn fill_circle<F>(center: DVec2, radius: f64, width: usize, height: usize, mut plot: F)
where
    F: FnMut(i32, i32),
{
    if !(radius > 0.0) || !center.is_finite() {
        return;
    }
    let r2 = radius * radius;
    let (x0, x1) = clip_span(center.x - radius, center.x + radius, width);
    let (y0, y1) = clip_span(center.y - radius, center.y + radius, height);

    let mut hit = false;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center;
            if d.length_squared() <= r2 {
                plot(x, y);
                hit = true;
            }
        }
    }
    if !hit && radius < 1.0 {
        plot(center.x.floor() as i32, center.y.floor() as i32);
    }
}

/// Axis-aligned rectangle by pixel-center test, clipped to `width` x `height`
pub fn fill_rect<F>(min: DVec2, max: DVec2, width: usize, height: usize, mut plot: F)
where
    F: FnMut(i32, i32),
{
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    let x_start = ((min.x - 0.5).ceil() as i64).max(0);
    let x_end = ((max.x - 0.5).ceil() as i64).min(width as i64);
    let y_start = ((min.y - 0.5).ceil() as i64).max(0);
    let y_end = ((max.y - 0.5).ceil() as i64).min(height as i64);
    for y in y_start..y_end {
        for x in x_start..x_end {
            plot(x as i32, y as i32);
        }
    }
}

/// Pixel range covering `[lo, hi]`, limited to `0..len`. Empty ranges come
/// back with start > end.
fn clip_span(lo: f64, hi: f64, len: usize) -> (i32, i32) {
    let start = (lo.floor() as i64).max(0);
    let end = (hi.ceil() as i64).min(len as i64 - 1);
    (start as i32, end as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(f: impl FnOnce(&mut dyn FnMut(i32, i32))) -> Vec<(i32, i32)> {
        let mut hits = Vec::new();
        f(&mut |x, y| hits.push((x, y)));
        hits.sort();
        hits
    }

    fn square(x0: f64, y0: f64, side: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0 + side, y0),
            DVec2::new(x0 + side, y0 + side),
            DVec2::new(x0, y0 + side),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = PixelCanvas::new(5, 1, Rgb::WHITE);
        draw_line(&mut canvas, 0, 0, 4, 0, Rgb::BLACK);
        assert!((0..5).all(|x| canvas.pixel(x, 0) == Some(Rgb::BLACK)));
        assert_eq!(canvas.pixel(0, 1), Some(Rgb::WHITE));
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = PixelCanvas::new(1, 2, Rgb::WHITE);
        draw_line(&mut canvas, 0, 3, 0, 0, Rgb::BLACK);
        assert!((0..4).all(|y| canvas.pixel(0, y) == Some(Rgb::BLACK)));
    }

    #[test]
    fn test_fill_square() {
        let hits = collect(|plot| fill_rings(&[square(1.0, 1.0, 2.0)], 10, 10, plot));
        assert_eq!(hits, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_fill_even_odd_hole() {
        let rings = [square(0.0, 0.0, 6.0), square(2.0, 2.0, 2.0)];
        let hits = collect(|plot| fill_rings(&rings, 10, 10, plot));
        assert_eq!(hits.len(), 36 - 4);
        assert!(!hits.contains(&(2, 2)));
        assert!(hits.contains(&(1, 1)));
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let hits = collect(|plot| fill_rings(&[square(-5.0, -5.0, 8.0)], 2, 2, plot));
        assert_eq!(hits, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_circle() {
        let hits = collect(|plot| fill_circle(DVec2::new(5.0, 5.0), 1.0, 10, 10, plot));
        assert_eq!(hits, vec![(4, 4), (4, 5), (5, 4), (5, 5)]);

        let tiny = collect(|plot| fill_circle(DVec2::new(3.2, 7.9), 0.1, 10, 10, plot));
        assert_eq!(tiny, vec![(3, 7)]);

        let none = collect(|plot| fill_circle(DVec2::new(3.0, 3.0), 0.0, 10, 10, plot));
        assert!(none.is_empty());
    }

    #[test]
    fn test_rect() {
        let hits = collect(|plot| fill_rect(DVec2::new(0.0, 0.0), DVec2::new(3.0, 1.0), 10, 10, plot));
        assert_eq!(hits, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_huge_shapes_clip_to_canvas() {
        let circle = collect(|plot| fill_circle(DVec2::new(5.0, 5.0), 54_772.0, 4, 3, plot));
        assert_eq!(circle.len(), 12);
        assert!(circle.iter().all(|&(x, y)| (0..4).contains(&x) && (0..3).contains(&y)));

        let rect = collect(|plot| fill_rect(DVec2::new(-1e12, 1.0), DVec2::new(1e12, 2.0), 4, 3, plot));
        assert_eq!(rect, vec![(0, 1), (1, 1), (2, 1), (3, 1)]);

        let offscreen = collect(|plot| fill_circle(DVec2::new(-50.0, 5.0), 10.0, 4, 3, plot));
        assert!(offscreen.is_empty());
    }

    #[test]
    fn test_stroke_closes_ring() {
        let mut canvas = PixelCanvas::new(4, 2, Rgb::WHITE);
        stroke_rings(&mut canvas, &[square(0.0, 0.0, 3.0)], Rgb::BLACK);
        assert_eq!(canvas.pixel(0, 2), Some(Rgb::BLACK));
        assert_eq!(canvas.pixel(1, 1), Some(Rgb::WHITE));
    }
}
