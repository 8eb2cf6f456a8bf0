//! Client-side pieces of the document scanner that hold their own invariants:
//! signature capture onto a raster surface and per-identity encryption of
//! values kept in local storage.

pub mod config;
pub mod crypto;
pub mod logging;
pub mod signature;
pub mod storage;
