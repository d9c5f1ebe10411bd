//! Rendering: turns a [`StrokeSegment`] into surface calls.
//!
//! [`paint_segment`] is the single rendering path. Local strokes, shape
//! previews, and remote replay all go through it, so a segment looks the same
//! on every peer regardless of who drew it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use frames::{StrokeSegment, Tool};

use crate::consts::{
    ARROW_HEAD_ANGLE, ARROW_HEAD_MAX_LEN, ARROW_HEAD_WIDTH_RATIO, ERASER_MIN_WIDTH,
    HIGHLIGHTER_MAX_OPACITY, HIGHLIGHTER_MIN_WIDTH,
};
use crate::surface::{Pen, Point, Surface};

/// Draw one segment onto `surface`.
pub fn paint_segment<S: Surface>(surface: &mut S, segment: &StrokeSegment) {
    let pen = pen_for(segment, surface.background());
    let (from, to) = (segment.from, segment.to);

    match segment.tool {
        Tool::Rectangle => surface.stroke_rect(from, to, &pen),
        Tool::Circle => {
            let radius = from.distance(to);
            surface.stroke_ellipse(from, radius, radius, &pen);
        }
        Tool::Arrow => {
            surface.stroke_line(from, to, &pen);
            if let Some([left, right]) = arrow_head(from, to, pen.width) {
                surface.stroke_polyline(&[left, to, right], &pen);
            }
        }
        Tool::Pencil | Tool::Eraser | Tool::Highlighter | Tool::Line => {
            surface.stroke_line(from, to, &pen);
        }
    }
}

/// Effective pen for a segment after tool rules are applied.
///
/// - eraser: background color, fully opaque, solid, at least
///   [`ERASER_MIN_WIDTH`] wide.
/// - highlighter: opacity capped at [`HIGHLIGHTER_MAX_OPACITY`], at least
///   [`HIGHLIGHTER_MIN_WIDTH`] wide.
#[must_use]
pub fn pen_for(segment: &StrokeSegment, background: &str) -> Pen {
    match segment.tool {
        Tool::Eraser => Pen {
            color: background.to_owned(),
            width: segment.width.max(ERASER_MIN_WIDTH),
            opacity: 1.0,
            dashed: false,
        },
        Tool::Highlighter => Pen {
            color: segment.color.clone(),
            width: segment.width.max(HIGHLIGHTER_MIN_WIDTH),
            opacity: segment
                .opacity
                .unwrap_or(HIGHLIGHTER_MAX_OPACITY)
                .min(HIGHLIGHTER_MAX_OPACITY),
            dashed: segment.is_dashed(),
        },
        _ => Pen {
            color: segment.color.clone(),
            width: segment.width,
            opacity: segment.opacity.unwrap_or(1.0),
            dashed: segment.is_dashed(),
        },
    }
}

/// The two arrowhead tips for a shaft ending at `to`. `None` for a
/// zero-length shaft, which has no direction.
#[must_use]
pub fn arrow_head(from: Point, to: Point, width: f64) -> Option<[Point; 2]> {
    if from.distance(to) == 0.0 {
        return None;
    }
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let len = (width * ARROW_HEAD_WIDTH_RATIO).min(ARROW_HEAD_MAX_LEN);
    let tip = |a: f64| Point::new(to.x - len * a.cos(), to.y - len * a.sin());
    Some([tip(angle - ARROW_HEAD_ANGLE), tip(angle + ARROW_HEAD_ANGLE)])
}
