//! Helpers for preparing NeRF-style `transforms*.json` camera metadata:
//! rewriting frame path prefixes in bulk and splitting frames into
//! train/val/test subsets.

pub mod document;
pub mod logging;
pub mod rewrite;
pub mod split;

pub use document::TransformsDocument;
