//! Vendor WCON dialect repair.
//!
//! WCON (Worm tracker Commons Object Notation) is a JSON format for worm
//! movement tracks. Several published datasets deviate from the canonical
//! schema in structurally predictable ways. This crate turns such documents
//! into canonical WCON:
//!
//! - [`normalize`] repairs the CeMEE Multi-Worm Tracker export (and anything
//!   shaped like it) into a [`WconDocument`];
//! - [`cemee`] describes where CeMEE samples live on Zenodo;
//! - [`tierpsy`] lays out Tierpsy Tracker features as WCON records.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wcon_dialect::{normalize, NormalizeOptions};
//!
//! let raw = json!({
//!     "units": {"t": "s", "x": "mm", "y": "mm"},
//!     "data": {
//!         "0": {"id": 6, "t": [[0.1, 0.2]], "x": [[1, 2]], "y": [[3, 4]],
//!               "@MWT": {"foo": [[9]]}}
//!     }
//! });
//! let doc = normalize(&raw, &NormalizeOptions::default()).unwrap();
//! let first = doc.data().as_sparse().unwrap().get(0).unwrap();
//! assert_eq!(first["id"], json!("6"));
//! assert_eq!(first["t"], json!([0.1, 0.2]));
//! assert_eq!(first["@MWT"]["foo"], json!([9]));
//! ```

pub mod cemee;
pub mod document;
pub mod error;
pub mod normalize;
pub mod options;
pub mod pointer;
pub mod tierpsy;
pub mod zenodo;

pub use document::{TrackData, WconDocument};
pub use error::NormalizeError;
pub use normalize::normalize;
pub use options::{DataLayout, NormalizeOptions, MWT_EXTENSION_KEY};
pub use pointer::Pointer;
pub use wcon_sparse::{SparseList, SparseListError};
