use image::imageops::{self, FilterType};
use image::RgbaImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use super::{AxesRect, FigureText, RenderError, TextAnchor};
use crate::style::{Style, Watermark};

/// Line spacing relative to the font height.
const LINE_SPACING: f64 = 1.2;
/// Gap between the axes frame and its title, in points.
const TITLE_PAD_PT: f64 = 6.0;
/// Average glyph advance relative to the font height.
pub(crate) const GLYPH_ASPECT: f64 = 0.55;

const LOGO_BOX: AxesRect = AxesRect::new(0.3, 0.002, 0.14, 0.07);
const LOGO_ALPHA: f64 = 0.8;

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

pub(crate) fn font(style: &Style, points: f64) -> FontDesc<'_> {
    FontDesc::new(
        FontFamily::from(style.font_family.as_str()),
        style.font_px(points),
        FontStyle::Normal,
    )
}

pub(crate) fn bold_font(style: &Style, points: f64) -> FontDesc<'_> {
    FontDesc::new(
        FontFamily::from(style.font_family.as_str()),
        style.font_px(points),
        FontStyle::Bold,
    )
}

/// Approximate rendered width in pixels; layout only needs a bound.
pub(crate) fn estimate_width(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * font_px * GLYPH_ASPECT
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Draw one line of text. Text is best effort: a failure loses the text
/// but not the image.
pub(crate) fn draw_text<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    at: (i32, i32),
    style: &TextStyle<'_>,
) {
    if let Err(e) = root.draw_text(text, style, at) {
        log::warn!("could not draw text {text:?}: {e}");
    }
}

/// Draw `\n`-separated lines whose last line sits on `bottom`.
fn draw_block<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    (x, bottom): (i32, i32),
    line_height: f64,
    style: &TextStyle<'_>,
) {
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().rev().enumerate() {
        let y = bottom - (i as f64 * line_height).round() as i32;
        draw_text(root, line, (x, y), style);
    }
}

/// Title centered above an axes rectangle.
pub(crate) fn draw_title<DB>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    rect: AxesRect,
    points: f64,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (left, top, right, _) = rect.to_pixels(root.dim_in_pixel());
    let text_style = font(style, points)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    let bottom = top - style.font_px(TITLE_PAD_PT).round() as i32;
    draw_block(
        root,
        title,
        ((left + right) / 2, bottom),
        style.font_px(points) * LINE_SPACING,
        &text_style,
    );
    Ok(())
}

pub(crate) fn draw_figure_text<DB>(
    root: &DrawingArea<DB, Shift>,
    item: &FigureText,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (w, h) = root.dim_in_pixel();
    let x = (item.at.0 * w as f64).round() as i32;
    let y = ((1.0 - item.at.1) * h as f64).round() as i32;
    let hpos = match item.anchor {
        TextAnchor::BottomLeft => HPos::Left,
        TextAnchor::BottomCenter => HPos::Center,
    };
    let desc = if item.bold {
        bold_font(style, item.size)
    } else {
        font(style, item.size)
    };
    let text_style = desc
        .color(&item.color.mix(item.opacity))
        .pos(Pos::new(hpos, VPos::Bottom));
    draw_block(
        root,
        &item.text,
        (x, y),
        style.font_px(item.size) * LINE_SPACING,
        &text_style,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Watermark
// ---------------------------------------------------------------------------

pub(crate) fn load_logo(style: &Style) -> Result<Option<RgbaImage>, RenderError> {
    let Some(path) = style.watermark.as_ref().and_then(|w| w.logo.as_ref()) else {
        return Ok(None);
    };
    let logo = image::open(path).map_err(|source| RenderError::Logo {
        path: path.clone(),
        source,
    })?;
    log::debug!("loaded watermark logo {}", path.display());
    Ok(Some(logo.to_rgba8()))
}

/// The texts of the license stamp.
pub(crate) fn watermark_texts(watermark: &Watermark) -> Vec<FigureText> {
    let mut preliminary = FigureText::new("Preliminary\nResults.", (0.46, 0.012), 12.0);
    preliminary.bold = true;
    preliminary.color = RGBColor(255, 0, 0);
    preliminary.opacity = 0.8;

    let mut license = FigureText::new(
        format!(
            "\u{a9} {} {}.\nCC BY SA 4.0 License.",
            watermark.partner_label, watermark.year
        ),
        (0.69, 0.003),
        7.0,
    );
    license.bold = true;

    vec![preliminary, license]
}

pub(crate) fn draw_watermark<DB>(
    root: &DrawingArea<DB, Shift>,
    watermark: &Watermark,
    logo: Option<&RgbaImage>,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if let Some(logo) = logo {
        draw_logo(root, logo)?;
    }
    for item in watermark_texts(watermark) {
        draw_figure_text(root, &item, style)?;
    }
    Ok(())
}

/// Fit the logo into its box, keeping the aspect ratio, and blend it in.
fn draw_logo<DB>(root: &DrawingArea<DB, Shift>, logo: &RgbaImage) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (left, top, right, bottom) = LOGO_BOX.to_pixels(root.dim_in_pixel());
    let (box_w, box_h) = ((right - left).max(1) as f64, (bottom - top).max(1) as f64);
    let (img_w, img_h) = logo.dimensions();
    if img_w == 0 || img_h == 0 {
        return Ok(());
    }
    let scale = (box_w / img_w as f64).min(box_h / img_h as f64);
    let (w, h) = (
        ((img_w as f64 * scale).round() as u32).max(1),
        ((img_h as f64 * scale).round() as u32).max(1),
    );
    let scaled = imageops::resize(logo, w, h, FilterType::Triangle);
    let x0 = left + ((box_w - w as f64) / 2.0).round() as i32;
    let y0 = top + ((box_h - h as f64) / 2.0).round() as i32;

    for (x, y, px) in scaled.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a == 0 {
            continue;
        }
        let alpha = a as f64 / 255.0 * LOGO_ALPHA;
        root.draw_pixel((x0 + x as i32, y0 + y as i32), &RGBAColor(r, g, b, alpha))?;
    }
    Ok(())
}
