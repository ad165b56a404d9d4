// Core modules implementing the palette model, query composition, storage,
// and error modeling.
pub mod catalog;
pub mod error;
pub mod palette;
pub mod query;
pub mod store;
