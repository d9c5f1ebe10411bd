//! In-memory RGBA surface.
//!
//! A deterministic software stroker: every draw call builds a coverage mask
//! from round-capped capsules, then composites the mask once with the pen's
//! opacity. Compositing once per call keeps overlapping pieces of the same
//! stroke (dash joins, rectangle corners) from darkening each other, which is
//! how a browser canvas behaves for a single `stroke()`.
//!
//! Each polyline edge is clipped to the surface (grown by the pen radius)
//! before it is dashed or rasterized, so the work per call is bounded by the
//! visible area no matter how far a relayed segment reaches off-screen. The
//! dash phase is carried arithmetically across the clipped-off part.
//!
//! Two rasters fed the same segments in the same order hold identical bytes,
//! so tests compare peers pixel-for-pixel.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use kurbo::{Ellipse, Line, ParamCurveNearest, PathEl, Rect, Shape};

use crate::color::{Rgb, parse_css_color};
use crate::consts::DASH_PATTERN;
use crate::surface::{Pen, Point, Surface};

/// Flattening tolerance for small ellipses, in pixels.
const ELLIPSE_TOLERANCE: f64 = 0.25;

/// Flattening tolerance as a fraction of the larger radius; keeps the
/// polyline short for huge ellipses.
const ELLIPSE_RELATIVE_TOLERANCE: f64 = 1e-4;

/// Extra margin, in pixels, kept around the surface when clipping edges.
const CLIP_MARGIN: f64 = 1.0;

/// An owned RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    background: String,
    background_rgb: Rgb,
    pixels: Vec<u8>,
}

impl Raster {
    /// A `width × height` surface filled with `background`.
    #[must_use]
    pub fn new(width: u32, height: u32, background: impl Into<String>) -> Self {
        let background = background.into();
        let background_rgb = parse_css_color(&background);
        let mut raster = Self {
            width,
            height,
            background,
            background_rgb,
            pixels: vec![0; width as usize * height as usize * 4],
        };
        raster.clear();
        raster
    }

    /// RGBA bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x as usize, y as usize);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Number of pixels that differ from the background.
    #[must_use]
    pub fn painted_pixels(&self) -> usize {
        let bg = self.background_rgb;
        self.pixels
            .chunks_exact(4)
            .filter(|px| px[0] != bg.r || px[1] != bg.g || px[2] != bg.b)
            .count()
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * 4
    }

    /// Stroke a polyline through `points` as one composite operation.
    fn stroke_path(&mut self, points: &[Point], pen: &Pen) {
        if points.is_empty() || !pen.width.is_finite() || pen.width <= 0.0 {
            return;
        }
        let radius = pen.width / 2.0;
        let clip = self.clip_rect(radius);
        let points: Vec<kurbo::Point> = points.iter().map(|&p| to_kurbo(p)).collect();
        let pieces = if pen.dashed {
            dash_pieces(&points, clip)
        } else if points.len() == 1 {
            vec![Line::new(points[0], points[0])]
        } else {
            points
                .windows(2)
                .filter_map(|w| clip_edge(Line::new(w[0], w[1]), clip))
                .collect()
        };
        self.fill_capsules(&pieces, radius, pen);
    }

    /// The surface grown by `radius` plus a margin; anything outside cannot
    /// touch a pixel.
    fn clip_rect(&self, radius: f64) -> Rect {
        let m = radius + CLIP_MARGIN;
        Rect::new(-m, -m, f64::from(self.width) + m, f64::from(self.height) + m)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn fill_capsules(&mut self, pieces: &[Line], radius: f64, pen: &Pen) {
        let Some(bounds) = PixelBounds::around(pieces, radius, self.width, self.height) else {
            return;
        };

        let radius_sq = radius * radius;
        let mut mask = vec![false; bounds.w * bounds.h];
        for &piece in pieces {
            let (a, b) = (piece.p0, piece.p1);
            let x0 = ((a.x.min(b.x) - radius).floor().max(bounds.x0 as f64)) as usize;
            let x1 = ((a.x.max(b.x) + radius).ceil().min(bounds.x1 as f64)) as usize;
            let y0 = ((a.y.min(b.y) - radius).floor().max(bounds.y0 as f64)) as usize;
            let y1 = ((a.y.max(b.y) + radius).ceil().min(bounds.y1 as f64)) as usize;
            for py in y0..y1 {
                for px in x0..x1 {
                    let center = kurbo::Point::new(px as f64 + 0.5, py as f64 + 0.5);
                    if distance_sq(center, piece) <= radius_sq {
                        mask[(py - bounds.y0) * bounds.w + (px - bounds.x0)] = true;
                    }
                }
            }
        }

        let src = parse_css_color(&pen.color);
        let alpha = if pen.opacity.is_finite() {
            pen.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        for row in 0..bounds.h {
            for col in 0..bounds.w {
                if mask[row * bounds.w + col] {
                    let i = self.offset(bounds.x0 + col, bounds.y0 + row);
                    blend(&mut self.pixels[i..i + 4], src, alpha);
                }
            }
        }
    }
}

impl Surface for Raster {
    type Snapshot = Vec<u8>;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn background(&self) -> &str {
        &self.background
    }

    fn stroke_polyline(&mut self, points: &[Point], pen: &Pen) {
        self.stroke_path(points, pen);
    }

    fn stroke_rect(&mut self, a: Point, b: Point, pen: &Pen) {
        let corners = [a, Point::new(b.x, a.y), b, Point::new(a.x, b.y), a];
        self.stroke_path(&corners, pen);
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, pen: &Pen) {
        let (rx, ry) = (rx.abs(), ry.abs());
        if !rx.is_finite() || !ry.is_finite() {
            return;
        }
        if rx == 0.0 && ry == 0.0 {
            self.stroke_path(&[center], pen);
            return;
        }
        let tolerance = (rx.max(ry) * ELLIPSE_RELATIVE_TOLERANCE).max(ELLIPSE_TOLERANCE);
        let ellipse = Ellipse::new(to_kurbo(center), (rx, ry), 0.0);
        let mut points = Vec::new();
        kurbo::flatten(ellipse.path_elements(tolerance), tolerance, |el| match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => points.push(Point::new(p.x, p.y)),
            PathEl::ClosePath => {
                if let Some(&first) = points.first() {
                    points.push(first);
                }
            }
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        });
        self.stroke_path(&points, pen);
    }

    fn clear(&mut self) {
        let bg = self.background_rgb;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 255]);
        }
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.pixels.clone()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        if snapshot.len() == self.pixels.len() {
            self.pixels.copy_from_slice(snapshot);
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Clipped, half-open pixel rectangle covering a set of capsules.
struct PixelBounds {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    w: usize,
    h: usize,
}

impl PixelBounds {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn around(pieces: &[Line], radius: f64, width: u32, height: u32) -> Option<Self> {
        let bbox = pieces
            .iter()
            .map(|piece| Rect::from_points(piece.p0, piece.p1))
            .reduce(|acc, r| acc.union(r))?;
        if !(bbox.x0.is_finite() && bbox.y0.is_finite() && bbox.x1.is_finite() && bbox.y1.is_finite()) {
            return None;
        }
        let x0 = (bbox.x0 - radius).floor().clamp(0.0, f64::from(width)) as usize;
        let y0 = (bbox.y0 - radius).floor().clamp(0.0, f64::from(height)) as usize;
        let x1 = (bbox.x1 + radius).ceil().clamp(0.0, f64::from(width)) as usize;
        let y1 = (bbox.y1 + radius).ceil().clamp(0.0, f64::from(height)) as usize;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x0,
            y0,
            x1,
            y1,
            w: x1 - x0,
            h: y1 - y0,
        })
    }
}

fn to_kurbo(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

/// Squared distance from `p` to the closest point of `piece`.
fn distance_sq(p: kurbo::Point, piece: Line) -> f64 {
    if piece.p0 == piece.p1 {
        return (p - piece.p0).hypot2();
    }
    piece.nearest(p, 1e-9).distance_sq
}

/// Parameter range `[t0, t1]` of `line` inside `rect` (Liang-Barsky), or
/// `None` when the line misses it.
fn clip_params(line: Line, rect: Rect) -> Option<(f64, f64)> {
    let (a, d) = (line.p0, line.p1 - line.p0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-d.x, a.x - rect.x0),
        (d.x, rect.x1 - a.x),
        (-d.y, a.y - rect.y0),
        (d.y, rect.y1 - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

fn clip_edge(line: Line, rect: Rect) -> Option<Line> {
    let (t0, t1) = clip_params(line, rect)?;
    Some(Line::new(line.p0.lerp(line.p1, t0), line.p0.lerp(line.p1, t1)))
}

/// The "on" pieces of [`DASH_PATTERN`] along a polyline, restricted to
/// `clip`. The dash phase runs continuously across vertices and across the
/// parts of each edge that fall outside `clip`.
fn dash_pieces(points: &[kurbo::Point], clip: Rect) -> Vec<Line> {
    let period: f64 = DASH_PATTERN.iter().sum();
    let mut pieces = Vec::new();
    let mut travelled = 0.0;

    for w in points.windows(2) {
        let edge = Line::new(w[0], w[1]);
        let len = edge.p0.distance(edge.p1);
        if len == 0.0 {
            continue;
        }
        if let Some((t0, t1)) = clip_params(edge, clip) {
            let (start, end) = (edge.p0.lerp(edge.p1, t0), edge.p0.lerp(edge.p1, t1));
            let offset = (travelled + t0 * len).rem_euclid(period);
            let visible = [PathEl::MoveTo(start), PathEl::LineTo(end)];
            let mut pen_at = start;
            for el in kurbo::dash(visible.into_iter(), offset, &DASH_PATTERN) {
                match el {
                    PathEl::MoveTo(p) => pen_at = p,
                    PathEl::LineTo(p) => {
                        pieces.push(Line::new(pen_at, p));
                        pen_at = p;
                    }
                    _ => {}
                }
            }
        }
        travelled += len;
    }
    pieces
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(dst: &mut [u8], src: Rgb, alpha: f64) {
    let mix = |s: u8, d: u8| (f64::from(s) * alpha + f64::from(d) * (1.0 - alpha)).round() as u8;
    dst[0] = mix(src.r, dst[0]);
    dst[1] = mix(src.g, dst[1]);
    dst[2] = mix(src.b, dst[2]);
    dst[3] = 255;
}
