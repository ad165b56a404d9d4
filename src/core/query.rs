//! Purpose: Turn raw listing parameters into a filter predicate plus pagination bounds.
//! Exports: `ListParams`, `Predicate`, `PageBounds`, `Pagination`, paging defaults.
//! Role: The query-composition core. Pure; no IO, no store types beyond `Palette`.
//! Invariants: `offset = (page - 1) * limit`; absent or non-numeric paging inputs
//! Invariants: clamp to the defaults rather than failing.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};
use crate::core::palette::Palette;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 12;

/// Raw listing inputs, shaped like the HTTP query string. Paging fields stay
/// string-typed so `page=abc` falls back to the default instead of failing
/// extraction.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    /// Comma-joined tag filter, matching the wire parameter.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn compose(&self) -> Result<(Predicate, PageBounds), Error> {
        let page = positive_or(self.page.as_deref(), DEFAULT_PAGE);
        let limit = positive_or(self.limit.as_deref(), DEFAULT_LIMIT);
        let bounds = PageBounds::new(page, limit)?;
        Ok((
            Predicate::new(self.tags.as_deref(), self.search.as_deref()),
            bounds,
        ))
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

/// Store-agnostic filter: the record's tag set must contain every required
/// tag (exact match), and when a search term is present at least one tag
/// must contain it case-insensitively. Both conditions combine with AND.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Predicate {
    required_tags: Vec<String>,
    search_lower: Option<String>,
}

impl Predicate {
    pub fn new(tags: Option<&str>, search: Option<&str>) -> Self {
        let required_tags = tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let search_lower = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        Self {
            required_tags,
            search_lower,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.required_tags.is_empty() && self.search_lower.is_none()
    }

    pub fn required_tags(&self) -> &[String] {
        &self.required_tags
    }

    pub fn matches(&self, palette: &Palette) -> bool {
        if !palette
            .tags
            .contains_all(self.required_tags.iter().map(String::as_str))
        {
            return false;
        }
        if let Some(needle) = &self.search_lower {
            if !palette.tags.any_contains(needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageBounds {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl PageBounds {
    pub fn new(page: u64, limit: u64) -> Result<Self, Error> {
        if page == 0 || limit == 0 {
            return Err(Error::new(ErrorKind::InvalidQuery)
                .with_message("page and limit must be positive"));
        }
        let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
            Error::new(ErrorKind::InvalidQuery)
                .with_message("page and limit are too large to combine")
        })?;
        Ok(Self {
            page,
            limit,
            offset,
        })
    }
}

/// Derived paging metadata, serialized with the wire field names.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl Pagination {
    /// `returned` is the record count of the page actually produced, so
    /// `has_more` reflects the same snapshot as `total`.
    pub fn compute(total: u64, bounds: PageBounds, returned: u64) -> Self {
        Self {
            total,
            page: bounds.page,
            pages: total.div_ceil(bounds.limit),
            has_more: bounds.offset.saturating_add(returned) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::palette::PaletteDraft;

    fn palette_with_tags(tags: &[&str]) -> Palette {
        let draft = PaletteDraft::new(
            vec![
                "#101010".to_string(),
                "#202020".to_string(),
                "#303030".to_string(),
            ],
            tags.iter().map(|t| t.to_string()).collect(),
        );
        let (colors, tags) = draft.validate().expect("fixture draft");
        Palette::create(colors, tags).expect("fixture palette")
    }

    #[test]
    fn paging_inputs_clamp_to_defaults() {
        let cases = [
            (None, None),
            (Some("0"), Some("0")),
            (Some("-2"), Some("-9")),
            (Some("abc"), Some("1.5")),
            (Some(""), Some(" ")),
        ];
        for (page, limit) in cases {
            let params = ListParams {
                page: page.map(str::to_string),
                limit: limit.map(str::to_string),
                ..ListParams::default()
            };
            let (_, bounds) = params.compose().expect("compose");
            assert_eq!(bounds.page, DEFAULT_PAGE, "page for {page:?}");
            assert_eq!(bounds.limit, DEFAULT_LIMIT, "limit for {limit:?}");
            assert_eq!(bounds.offset, 0);
        }
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let (_, bounds) = ListParams::new()
            .with_page(3)
            .with_limit(12)
            .compose()
            .expect("compose");
        assert_eq!(bounds.offset, 24);
    }

    #[test]
    fn overflowing_bounds_are_an_invalid_query() {
        let err = PageBounds::new(u64::MAX, u64::MAX).expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);

        let err = PageBounds::new(1, 0).expect_err("zero limit");
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn tag_filter_requires_every_listed_tag() {
        let r1 = palette_with_tags(&["a", "b"]);
        let r2 = palette_with_tags(&["a"]);
        let r3 = palette_with_tags(&["b", "c"]);

        let predicate = Predicate::new(Some("a,b"), None);
        assert!(predicate.matches(&r1));
        assert!(!predicate.matches(&r2));
        assert!(!predicate.matches(&r3));
    }

    #[test]
    fn search_matches_tag_substrings_case_insensitively() {
        let r1 = palette_with_tags(&["a", "b"]);
        let r2 = palette_with_tags(&["a"]);
        let r3 = palette_with_tags(&["b", "c"]);

        let predicate = Predicate::new(None, Some("a"));
        assert!(predicate.matches(&r1));
        assert!(predicate.matches(&r2));
        assert!(!predicate.matches(&r3));

        let upper = Predicate::new(None, Some("PAST"));
        assert!(upper.matches(&palette_with_tags(&["pastel"])));
    }

    #[test]
    fn tags_and_search_combine_with_and() {
        let both = Predicate::new(Some("warm"), Some("sea"));
        assert!(both.matches(&palette_with_tags(&["warm", "seafoam"])));
        assert!(!both.matches(&palette_with_tags(&["warm"])));
        assert!(!both.matches(&palette_with_tags(&["seafoam"])));
    }

    #[test]
    fn blank_filter_inputs_impose_no_condition() {
        let predicate = Predicate::new(Some(" , ,"), Some("  "));
        assert!(predicate.is_unfiltered());
        assert!(predicate.matches(&palette_with_tags(&["anything"])));

        let spaced = Predicate::new(Some(" warm , sea "), None);
        assert_eq!(spaced.required_tags(), ["warm", "sea"]);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        let cases = [(0, 12, 0), (1, 12, 1), (12, 12, 1), (13, 12, 2), (25, 12, 3)];
        for (total, limit, pages) in cases {
            let bounds = PageBounds::new(1, limit).expect("bounds");
            assert_eq!(
                Pagination::compute(total, bounds, total.min(limit)).pages,
                pages,
                "total={total} limit={limit}"
            );
        }
    }

    #[test]
    fn has_more_tracks_remaining_records() {
        let first = PageBounds::new(1, 12).expect("bounds");
        assert!(Pagination::compute(25, first, 12).has_more);

        let last = PageBounds::new(3, 12).expect("bounds");
        assert!(!Pagination::compute(25, last, 1).has_more);

        let past_end = PageBounds::new(9, 12).expect("bounds");
        assert!(!Pagination::compute(25, past_end, 0).has_more);
    }

    #[test]
    fn pagination_serializes_wire_field_names() {
        let bounds = PageBounds::new(2, 12).expect("bounds");
        let json = serde_json::to_value(Pagination::compute(25, bounds, 12)).expect("serialize");
        assert_eq!(json["total"], 25);
        assert_eq!(json["page"], 2);
        assert_eq!(json["pages"], 3);
        assert_eq!(json["hasMore"], true);
    }
}
