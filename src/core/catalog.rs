//! Purpose: The catalog services: paginated filtered listing, tag aggregation, creation.
//! Exports: `Catalog`, `Page`, `TagCount`, `POPULAR_TAG_LIMIT`.
//! Role: Executes composed queries against the store and owns record creation.
//! Invariants: `total` and the returned page come from one predicate over one scan.
//! Invariants: Tag reads propagate store failures; they never degrade to empty lists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::palette::{Palette, PaletteDraft};
use crate::core::query::{ListParams, Pagination};
use crate::core::store::Store;

pub const POPULAR_TAG_LIMIT: usize = 8;

/// One page of listing results plus its paging metadata; serializes as the
/// listing response body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Page {
    pub results: Vec<Palette>,
    pub pagination: Pagination,
}

/// A tag and its occurrence count, for the popularity ranking.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

pub struct Catalog {
    store: Store,
}

impl Catalog {
    pub fn open(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store: Store::open(store_path),
        }
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// Newest first, always. Ties on `createdAt` order the later append
    /// first, which the reverse before the stable sort provides.
    pub fn list(&self, params: &ListParams) -> Result<Page, Error> {
        let (predicate, bounds) = params.compose()?;
        let mut records = self.store.scan()?;
        records.retain(|palette| predicate.matches(palette));
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = records.len() as u64;
        let start = usize::try_from(bounds.offset)
            .unwrap_or(usize::MAX)
            .min(records.len());
        let limit = usize::try_from(bounds.limit).unwrap_or(usize::MAX);
        let results: Vec<Palette> = records.into_iter().skip(start).take(limit).collect();
        let pagination = Pagination::compute(total, bounds, results.len() as u64);
        Ok(Page {
            results,
            pagination,
        })
    }

    /// Every unique tag across the catalog, sorted lexicographically.
    pub fn distinct_tags(&self) -> Result<Vec<String>, Error> {
        Ok(self.tag_counts()?.into_keys().collect())
    }

    /// Occurrence counts sorted descending, ties broken by tag name, capped
    /// at `limit`.
    pub fn popular_tags(&self, limit: usize) -> Result<Vec<TagCount>, Error> {
        let counts = self.tag_counts()?;
        let mut ranked: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// The creation path: validate, assign identity, persist, echo back.
    pub fn add(&self, draft: &PaletteDraft) -> Result<Palette, Error> {
        let (colors, tags) = draft.validate()?;
        let palette = Palette::create(colors, tags)?;
        self.store.append(&palette)?;
        Ok(palette)
    }

    fn tag_counts(&self) -> Result<BTreeMap<String, u64>, Error> {
        let records = self.store.scan()?;
        let mut counts = BTreeMap::new();
        for palette in &records {
            for tag in palette.tags.iter() {
                *counts.entry(tag.to_string()).or_insert(0u64) += 1;
            }
        }
        Ok(counts)
    }
}
