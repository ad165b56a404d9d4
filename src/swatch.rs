//! Purpose: Render palettes as terminal rows with optional truecolor swatches.
//! Exports: `palette_row`, `palette_rows`.
//! Role: Human-readable CLI presentation for `list` and `add`.
//! Invariants: With color disabled the output is plain text with no ANSI escapes.

use time::format_description::well_known::Rfc3339;

use swatchbook::api::Palette;

const RESET: &str = "\u{1b}[0m";

/// One line per palette: id, swatches, tags, creation time.
pub fn palette_row(palette: &Palette, use_color: bool) -> String {
    let swatches = palette
        .colors
        .iter()
        .map(|color| swatch_cell(color.rgb(), &color.to_string(), use_color))
        .collect::<Vec<_>>()
        .join(" ");
    let tags = if palette.tags.is_empty() {
        "-".to_string()
    } else {
        palette.tags.iter().collect::<Vec<_>>().join(",")
    };
    let created = palette
        .created_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| "-".to_string());
    format!("{}  {swatches}  [{tags}]  {created}", palette.id)
}

pub fn palette_rows(palettes: &[Palette], use_color: bool) -> String {
    palettes
        .iter()
        .map(|palette| palette_row(palette, use_color))
        .collect::<Vec<_>>()
        .join("\n")
}

// 24-bit background cell over the hex code, so the code stays readable in
// terminals that drop the escape.
fn swatch_cell((r, g, b): (u8, u8, u8), hex: &str, use_color: bool) -> String {
    if !use_color {
        return hex.to_string();
    }
    let fg = if luma(r, g, b) > 140 { "30" } else { "97" };
    format!("\u{1b}[48;2;{r};{g};{b}m\u{1b}[{fg}m {hex} {RESET}")
}

fn luma(r: u8, g: u8, b: u8) -> u32 {
    (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000
}
