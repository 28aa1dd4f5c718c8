//! Tag layout and width selection for the valpak codec.
//!
//! This crate is the wire-format contract: tag byte classification, the
//! extended-type id/width layout, and smallest-width selection for integers
//! and lengths. It holds no buffers and performs no I/O—every other crate
//! encodes to and decodes from the table defined here.
//!
//! # Design Principles
//!
//! - **Single source of truth** - The tag table lives in [`tag`] and is
//!   duplicated nowhere else; see `FORMAT.md` for the prose specification.
//! - **Total classification** - Every one of the 256 tag bytes either
//!   classifies or is rejected as reserved; the decoder never guesses.
//! - **Fixed byte order** - Multi-byte payloads are always little-endian.

mod error;
mod tag;
mod width;

pub use error::{TagError, TagResult};
pub use tag::{
    ext_tag, ExtKind, Tag, EXT_BASE, FIXARR_BASE, FIXARR_MAX, FIXINT_MAX, FIXMAP_BASE, FIXMAP_MAX,
    FIXSTR_BASE, FIXSTR_MAX, TAG_EOS, TAG_F16, TAG_F32, TAG_F64, TAG_FALSE, TAG_IDX, TAG_NAN,
    TAG_NIL, TAG_NINF, TAG_PINF, TAG_SARR, TAG_SMAP, TAG_SSET, TAG_TRUE,
};
pub use width::Width;
