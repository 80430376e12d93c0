//! Incremental pagination engine.
//!
//! - [`source`] - The [`PagingSource`] contract
//! - [`offset`] - Offset-windowed source over a [`PageProvider`]
//! - [`id_list`] - One-item-per-page source over a fixed id list
//! - [`pager`] - Load-state machine and page streams

pub mod id_list;
pub mod offset;
pub mod pager;
pub mod source;

pub use id_list::{IdListPagingSource, ItemLookup};
pub use offset::{OffsetPagingSource, PageProvider};
pub use pager::{
    DEFAULT_PAGE_SIZE, LoadState, Pager, PagingConfig, PagingError, page_stream,
};
pub use source::{LoadResult, PagingSource};
