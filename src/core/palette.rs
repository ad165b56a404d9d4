//! Purpose: Palette domain model and the creation validation boundary.
//! Exports: `HexColor`, `TagSet`, `PaletteDraft`, `Palette`, canonical bounds.
//! Role: Core types shared by the store, the catalog services, the HTTP surface, and the CLI.
//! Invariants: A `Palette` built through `Palette::create` always satisfies the canonical
//! Invariants: bounds (3..=5 colors, at most 3 tags); stored and submitted records are
//! Invariants: checked against the same rule, so client and store never disagree.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::core::error::{Error, ErrorKind};

pub const MIN_COLORS: usize = 3;
pub const MAX_COLORS: usize = 5;
pub const MAX_TAGS: usize = 3;

const ID_BYTES: usize = 12;

/// One `#rrggbb` color. Parsing normalizes to lowercase; the channel values
/// are kept decoded so renderers never re-parse.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HexColor {
    rgb: [u8; 3],
}

impl HexColor {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::parse_str(raw).map_err(|message| {
            Error::new(ErrorKind::Validation)
                .with_message(message)
                .with_hint("Colors are 6-digit hex strings like \"#1fa2ff\".")
        })
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.rgb[0], self.rgb[1], self.rgb[2])
    }

    fn parse_str(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color {trimmed:?}: expected a leading '#'"))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid color {trimmed:?}: expected #rrggbb hex"));
        }
        let mut rgb = [0u8; 3];
        for (slot, index) in rgb.iter_mut().zip([0, 2, 4]) {
            *slot = u8::from_str_radix(&hex[index..index + 2], 16)
                .map_err(|_| format!("invalid color {trimmed:?}: expected #rrggbb hex"))?;
        }
        Ok(Self { rgb })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

impl FromStr for HexColor {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(DeError::custom)
    }
}

/// Tags with set membership and insertion-ordered iteration. Duplicates
/// collapse on insert; membership checks are exact, substring search is
/// case-insensitive.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the tag was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.iter().any(|existing| *existing == tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }

    pub fn contains_all<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> bool {
        required.into_iter().all(|tag| self.contains(tag))
    }

    /// True when at least one tag contains `needle_lower` as a substring.
    /// The needle must already be lowercased.
    pub fn any_contains(&self, needle_lower: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle_lower))
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tags.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tags = Vec::<String>::deserialize(deserializer)?;
        Ok(tags.into_iter().collect())
    }
}

/// An unvalidated submission, shaped like the HTTP creation body.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaletteDraft {
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PaletteDraft {
    pub fn new(colors: Vec<String>, tags: Vec<String>) -> Self {
        Self {
            colors: Some(colors),
            tags,
        }
    }

    /// The creation validation boundary. Tags are trimmed and deduplicated
    /// before the bound check; every failure reports `Validation`.
    pub fn validate(&self) -> Result<(Vec<HexColor>, TagSet), Error> {
        let raw_colors = self.colors.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Validation).with_message("colors array is required")
        })?;

        let mut tags = TagSet::new();
        for raw in &self.tags {
            let tag = raw.trim();
            if tag.is_empty() {
                return Err(Error::new(ErrorKind::Validation)
                    .with_message("tags must be non-empty strings"));
            }
            tags.insert(tag);
        }

        if let Some(message) = bounds_error(raw_colors.len(), tags.len()) {
            return Err(Error::new(ErrorKind::Validation).with_message(message));
        }

        let mut colors = Vec::with_capacity(raw_colors.len());
        for raw in raw_colors {
            colors.push(HexColor::parse(raw)?);
        }
        Ok((colors, tags))
    }
}

/// The canonical bounds rule, shared by draft validation and the store's
/// scan-time check.
pub fn bounds_error(colors: usize, tags: usize) -> Option<String> {
    if !(MIN_COLORS..=MAX_COLORS).contains(&colors) {
        return Some(format!(
            "palette must have between {MIN_COLORS} and {MAX_COLORS} colors"
        ));
    }
    if tags > MAX_TAGS {
        return Some(format!("palette can have at most {MAX_TAGS} tags"));
    }
    None
}

/// One stored palette record. Immutable once created; the catalog never
/// updates records in place.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Palette {
    pub id: String,
    pub colors: Vec<HexColor>,
    pub tags: TagSet,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Palette {
    /// Assigns an identifier and creation timestamp to validated parts.
    pub fn create(colors: Vec<HexColor>, tags: TagSet) -> Result<Self, Error> {
        Ok(Self {
            id: new_palette_id()?,
            colors,
            tags,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}

fn new_palette_id() -> Result<String, Error> {
    let mut bytes = [0u8; ID_BYTES];
    getrandom::fill(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal).with_message(format!("id generation failed: {err}"))
    })?;
    let mut id = String::with_capacity(ID_BYTES * 2);
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    Ok(id)
}
