//! CSS color parsing for the software raster.
//!
//! Participant colors arrive as `hsl(...)` strings from the server while the
//! toolbar produces hex. Anything unparseable renders black.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a CSS color, falling back to black.
#[must_use]
pub fn parse_css_color(raw: &str) -> Rgb {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if trimmed.starts_with('#') {
        return parse_hex_rgb(trimmed).unwrap_or(Rgb::BLACK);
    }
    if let Some(args) = function_args(&lower, "rgb") {
        return parse_rgb_args(args).unwrap_or(Rgb::BLACK);
    }
    if let Some(args) = function_args(&lower, "hsl") {
        return parse_hsl_args(args).unwrap_or(Rgb::BLACK);
    }
    Rgb::BLACK
}

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_hex_rgb(raw: &str) -> Option<Rgb> {
    let hex = raw.trim().strip_prefix('#')?;
    // Hex digits are < 16, so the narrowing is lossless.
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    match digits.as_slice() {
        [r, g, b] => Some(Rgb::new(r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Some(Rgb::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        _ => None,
    }
}

/// Arguments of `name(...)` or `namea(...)`, split on commas or whitespace.
fn function_args<'a>(s: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let rest = s.strip_prefix(name)?;
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect(),
    )
}

fn parse_number(s: &str) -> Option<f64> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

fn parse_percent(s: &str) -> Option<f64> {
    parse_number(s.strip_suffix('%')?).map(|v| (v / 100.0).clamp(0.0, 1.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn parse_rgb_args(args: Vec<&str>) -> Option<Rgb> {
    let [r, g, b, ..] = args.as_slice() else {
        return None;
    };
    let component = |s: &str| {
        if s.ends_with('%') {
            parse_percent(s).map(|p| p * 255.0)
        } else {
            parse_number(s)
        }
    };
    Some(Rgb::new(
        channel(component(r)?),
        channel(component(g)?),
        channel(component(b)?),
    ))
}

fn parse_hsl_args(args: Vec<&str>) -> Option<Rgb> {
    let [h, s, l, ..] = args.as_slice() else {
        return None;
    };
    let hue = parse_number(h.trim_end_matches("deg"))?.rem_euclid(360.0);
    let sat = parse_percent(s)?;
    let light = parse_percent(l)?;
    let (r, g, b) = hsl_to_rgb(hue, sat, light);
    Some(Rgb::new(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0)))
}

/// Standard HSL → RGB, all outputs in `[0, 1]`.
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp {
        v if v < 1.0 => (c, x, 0.0),
        v if v < 2.0 => (x, c, 0.0),
        v if v < 3.0 => (0.0, c, x),
        v if v < 4.0 => (0.0, x, c),
        v if v < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r1 + m, g1 + m, b1 + m)
}
