//! Purpose: Shared core library crate used by the `swatchbook` CLI and tests.
//! Exports: `core` (palette model, query composition, storage, errors), `api`
//! Exports: (the stable boundary), `paths` (data-dir resolution).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod paths;
