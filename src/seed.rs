//! Purpose: Generate sample palettes from classic color-scheme families.
//! Exports: `Scheme`, `seed`.
//! Role: Backs `swatchbook seed`; fills an empty catalog with plausible data.
//! Invariants: Every generated draft passes the creation validator and is
//! Invariants: persisted through the same `Catalog::add` path as submissions.

use clap::ValueEnum;

use swatchbook::api::{Catalog, Error, ErrorKind, Palette, PaletteDraft};

pub const DEFAULT_SEED_COUNT: usize = 20;

const SATURATION: f64 = 0.6;

const STYLE_TAGS: &[&str] = &[
    "minimal", "vibrant", "dark", "light", "pastel", "vintage", "modern", "elegant", "fun",
    "warm", "cold", "autumn", "spring", "summer",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Scheme {
    Monochrome,
    Analogous,
    Complementary,
    Triadic,
}

impl Scheme {
    fn tag(self) -> &'static str {
        match self {
            Scheme::Monochrome => "monochrome",
            Scheme::Analogous => "analogous",
            Scheme::Complementary => "complementary",
            Scheme::Triadic => "triadic",
        }
    }
}

/// Generates `count` palettes and persists them; a fixed `scheme` pins the
/// family, otherwise each palette picks one at random.
pub fn seed(catalog: &Catalog, count: usize, scheme: Option<Scheme>) -> Result<Vec<Palette>, Error> {
    let mut created = Vec::with_capacity(count);
    for _ in 0..count {
        let scheme = match scheme {
            Some(scheme) => scheme,
            None => random_scheme()?,
        };
        let draft = generate(scheme)?;
        created.push(catalog.add(&draft)?);
    }
    Ok(created)
}

fn generate(scheme: Scheme) -> Result<PaletteDraft, Error> {
    let base_hue = random_unit()? * 360.0;
    let colors = match scheme {
        // Single hue, ramping value from dark to light.
        Scheme::Monochrome => (0..5)
            .map(|i| hex(base_hue, SATURATION, 0.2 + i as f64 * 0.15))
            .collect(),
        // Five hues in 30-degree steps around the base.
        Scheme::Analogous => (-2i32..=2)
            .map(|i| hex(wrap_hue(base_hue + i as f64 * 30.0), SATURATION, 0.7))
            .collect(),
        // Three base values plus two from the opposite hue.
        Scheme::Complementary => {
            let complement = wrap_hue(base_hue + 180.0);
            let mut colors: Vec<String> = (0..3)
                .map(|i| hex(base_hue, SATURATION, 0.3 + i as f64 * 0.2))
                .collect();
            colors.extend((0..2).map(|i| hex(complement, SATURATION, 0.4 + i as f64 * 0.2)));
            colors
        }
        // Two values per hue at 0/120/240 degrees, capped at five colors.
        Scheme::Triadic => {
            let mut colors = Vec::new();
            for offset in [0.0, 120.0, 240.0] {
                let hue = wrap_hue(base_hue + offset);
                for i in 0..2 {
                    colors.push(hex(hue, SATURATION, 0.4 + i as f64 * 0.2));
                }
            }
            colors.truncate(5);
            colors
        }
    };

    let style = STYLE_TAGS[random_index(STYLE_TAGS.len())?];
    Ok(PaletteDraft::new(
        colors,
        vec![scheme.tag().to_string(), style.to_string()],
    ))
}

fn hex(hue: f64, saturation: f64, value: f64) -> String {
    let (r, g, b) = hsv_to_rgb(hue, saturation, value);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn wrap_hue(hue: f64) -> f64 {
    hue.rem_euclid(360.0)
}

/// Standard HSV to RGB conversion; hue in degrees, saturation and value in 0..=1.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let hue = wrap_hue(hue);
    let chroma = value * saturation;
    let secondary = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let base = value - chroma;
    let (r, g, b) = match hue {
        h if h < 60.0 => (chroma, secondary, 0.0),
        h if h < 120.0 => (secondary, chroma, 0.0),
        h if h < 180.0 => (0.0, chroma, secondary),
        h if h < 240.0 => (0.0, secondary, chroma),
        h if h < 300.0 => (secondary, 0.0, chroma),
        _ => (chroma, 0.0, secondary),
    };
    (
        ((r + base) * 255.0).round() as u8,
        ((g + base) * 255.0).round() as u8,
        ((b + base) * 255.0).round() as u8,
    )
}

fn random_scheme() -> Result<Scheme, Error> {
    let schemes = [
        Scheme::Monochrome,
        Scheme::Analogous,
        Scheme::Complementary,
        Scheme::Triadic,
    ];
    Ok(schemes[random_index(schemes.len())?])
}

fn random_index(len: usize) -> Result<usize, Error> {
    Ok((random_unit()? * len as f64) as usize % len)
}

fn random_unit() -> Result<f64, Error> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal).with_message(format!("randomness unavailable: {err}"))
    })?;
    Ok(u64::from_le_bytes(bytes) as f64 / u64::MAX as f64)
}
