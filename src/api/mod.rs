//! Purpose: Define the stable public Rust API boundary for swatchbook.
//! Exports: Catalog types and operations needed by the CLI and server.
//! Role: Public, additive-only surface; hides internal storage modules.
//! Invariants: This module is the only public path to catalog primitives.

mod remote;

pub use crate::core::catalog::{Catalog, POPULAR_TAG_LIMIT, Page, TagCount};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::palette::{
    HexColor, MAX_COLORS, MAX_TAGS, MIN_COLORS, Palette, PaletteDraft, TagSet,
};
pub use crate::core::query::{DEFAULT_LIMIT, DEFAULT_PAGE, ListParams, Pagination, Predicate};
pub use remote::RemoteCatalog;

pub type ApiResult<T> = Result<T, Error>;
