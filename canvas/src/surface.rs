//! Drawing surface abstraction.
//!
//! The engine never talks to a concrete canvas. Everything it paints goes
//! through [`Surface`], which has two implementations: the in-memory
//! [`crate::raster::Raster`] used headless and in tests, and the browser
//! `CanvasSurface` in [`crate::web`].
//!
//! Operations are infallible from the engine's point of view. A surface that
//! can fail (the browser context) reports failures on its own channel.

pub use frames::Point;

/// Stroke parameters for a single draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    /// CSS color string.
    pub color: String,
    pub width: f64,
    /// `0.0..=1.0`, applied once per draw call.
    pub opacity: f64,
    pub dashed: bool,
}

impl Pen {
    #[must_use]
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            opacity: 1.0,
            dashed: false,
        }
    }
}

/// A pixel surface the engine can stroke, clear, and snapshot.
pub trait Surface {
    /// Full copy of the pixels, cheap enough to keep thirty of.
    type Snapshot: Clone;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// CSS color the surface clears to; the eraser paints with it.
    fn background(&self) -> &str;

    /// Open polyline through `points` with round caps and joins, composited
    /// as a single stroke.
    fn stroke_polyline(&mut self, points: &[Point], pen: &Pen);

    /// Straight segment with round caps.
    fn stroke_line(&mut self, from: Point, to: Point, pen: &Pen) {
        self.stroke_polyline(&[from, to], pen);
    }

    /// Axis-aligned rectangle outline with corners `a` and `b`.
    fn stroke_rect(&mut self, a: Point, b: Point, pen: &Pen);

    /// Ellipse outline centred at `center`.
    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, pen: &Pen);

    /// Reset every pixel to the background.
    fn clear(&mut self);

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: &Self::Snapshot);
}
