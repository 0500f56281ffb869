//! WCON worm-track dialect repair.
//!
//! Facade over the workspace crates:
//!
//! - [`sparse`]: sparse integer-indexed lists (`wcon-sparse`)
//! - [`dialect`]: vendor dialect repair, CeMEE and Tierpsy helpers
//!   (`wcon-dialect`)
//! - [`cli`]: text-in/text-out operations behind the binaries

pub use wcon_dialect as dialect;
pub use wcon_sparse as sparse;

pub mod cli;

pub use wcon_dialect::{
    normalize, DataLayout, NormalizeError, NormalizeOptions, Pointer, TrackData, WconDocument,
};
pub use wcon_sparse::{SparseList, SparseListError};
