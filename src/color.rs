use std::str::FromStr;

use palette::Srgb;
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Hex colors
// ---------------------------------------------------------------------------

/// Parse `#RRGGBB` (or `RRGGBB`) into a plotting color.
pub fn hex(code: &str) -> Option<RGBColor> {
    let rgb = Srgb::<u8>::from_str(code).ok()?;
    Some(RGBColor(rgb.red, rgb.green, rgb.blue))
}

/// Parse a hex literal known at compile time; falls back to black.
pub(crate) fn hex_or_black(code: &str) -> RGBColor {
    hex(code).unwrap_or(RGBColor(0, 0, 0))
}

fn to_rgb(c: Srgb) -> RGBColor {
    let c: Srgb<u8> = c.into_format();
    RGBColor(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Colormaps
// ---------------------------------------------------------------------------

/// Piecewise-linear channel: `(position, value)` anchors on 0..=1.
type Channel = &'static [(f32, f32)];

const JET_RED: Channel = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: Channel = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: Channel = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interpolate(channel: Channel, t: f32) -> f32 {
    for pair in channel.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            let w = if x1 > x0 { (t - x0) / (x1 - x0) } else { 0.0 };
            return y0 + w * (y1 - y0);
        }
    }
    channel.last().map_or(0.0, |&(_, y)| y)
}

#[derive(Debug, Clone, PartialEq)]
enum Palette {
    /// Continuous map from per-channel anchors.
    Segmented {
        red: Channel,
        green: Channel,
        blue: Channel,
    },
    /// Discrete colors, one per equal slice of the normalized range.
    Listed(Vec<RGBColor>),
}

/// Maps values to colors, with dedicated colors for masked (NaN) and
/// out-of-range cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    palette: Palette,
    pub bad: RGBColor,
    pub over: RGBColor,
    pub under: RGBColor,
}

impl Colormap {
    /// The classic blue → cyan → yellow → red map. Masked and under-range
    /// cells are black, over-range cells white.
    pub fn jet() -> Self {
        Colormap {
            palette: Palette::Segmented {
                red: JET_RED,
                green: JET_GREEN,
                blue: JET_BLUE,
            },
            bad: RGBColor(0, 0, 0),
            over: RGBColor(255, 255, 255),
            under: RGBColor(0, 0, 0),
        }
    }

    /// Three-state signal status: good signal, saturated, low SNR.
    pub fn signal_status() -> Self {
        let colors = vec![
            hex_or_black("#2E8B57"),
            hex_or_black("#FF0000"),
            hex_or_black("#C8C8C8"),
        ];
        Colormap::listed(colors)
    }

    /// Discrete map; out-of-range values take the end colors.
    pub fn listed(colors: Vec<RGBColor>) -> Self {
        let under = colors.first().copied().unwrap_or(RGBColor(0, 0, 0));
        let over = colors.last().copied().unwrap_or(RGBColor(0, 0, 0));
        Colormap {
            palette: Palette::Listed(colors),
            bad: RGBColor(255, 255, 255),
            over,
            under,
        }
    }

    /// Color at normalized position `t` in `0..=1`.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0) as f32;
        match &self.palette {
            Palette::Segmented { red, green, blue } => to_rgb(Srgb::new(
                interpolate(red, t),
                interpolate(green, t),
                interpolate(blue, t),
            )),
            Palette::Listed(colors) => {
                if colors.is_empty() {
                    return self.bad;
                }
                let idx = ((t * colors.len() as f32) as usize).min(colors.len() - 1);
                colors[idx]
            }
        }
    }

    /// Color for a data value given the display limits.
    pub fn color_for(&self, value: f64, vmin: f64, vmax: f64) -> RGBColor {
        if value.is_nan() {
            self.bad
        } else if value < vmin {
            self.under
        } else if value > vmax {
            self.over
        } else if vmax > vmin {
            self.sample((value - vmin) / (vmax - vmin))
        } else {
            self.sample(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_codes() {
        assert_eq!(hex("#58B13F"), Some(RGBColor(0x58, 0xB1, 0x3F)));
        assert_eq!(hex("0000ff"), Some(RGBColor(0, 0, 255)));
        assert_eq!(hex("#zz0000"), None);
    }

    #[test]
    fn jet_endpoints() {
        let jet = Colormap::jet();
        assert_eq!(jet.sample(0.0), RGBColor(0, 0, 128));
        assert_eq!(jet.sample(1.0), RGBColor(128, 0, 0));
        let mid = jet.sample(0.5);
        assert!(mid.1 == 255, "middle of jet is green-ish: {mid:?}");
    }

    #[test]
    fn special_cells() {
        let jet = Colormap::jet();
        assert_eq!(jet.color_for(f64::NAN, 0.0, 1.0), RGBColor(0, 0, 0));
        assert_eq!(jet.color_for(2.0, 0.0, 1.0), RGBColor(255, 255, 255));
        assert_eq!(jet.color_for(-1.0, 0.0, 1.0), RGBColor(0, 0, 0));
    }

    #[test]
    fn status_levels_map_to_their_slot() {
        let status = Colormap::signal_status();
        let good = status.color_for(0.0, -0.5, 2.5);
        let saturated = status.color_for(1.0, -0.5, 2.5);
        let low_snr = status.color_for(2.0, -0.5, 2.5);
        assert_eq!(saturated, RGBColor(255, 0, 0));
        assert_ne!(good, saturated);
        assert_ne!(low_snr, saturated);
        assert_ne!(good, low_snr);
    }
}
