//! Compact self-describing binary serialization for the valpak format.
//!
//! Values carry their own type tags on the wire, so a decoder needs no
//! schema: small integers, string lengths and short containers fold into a
//! single tag byte, larger ones carry a smallest-width little-endian
//! payload. See `FORMAT.md` for the byte-level layout and the `wire` crate
//! for the tag table itself.
//!
//! # Architecture
//!
//! - [`Packer`] — the encoder: one `pack_*` operation per value kind, over
//!   an owned growable buffer or a streaming flush callback.
//! - [`Unpacker`] — the pull decoder: yields one [`Extract`] per tag,
//!   borrowing payload bytes from the input.
//! - [`pack_value`] / [`unpack_value`] — the tree walkers: encode and
//!   decode whole [`Value`] trees, resolving back-references, explicit
//!   array indexes and streaming aggregates, bounded by [`Limits`].
//!
//! # Example
//!
//! ```
//! use codec::{pack_to_vec, unpack_value, Value};
//!
//! let value = Value::Map(vec![
//!     (Value::Uint(1), Value::from("a")),
//!     (Value::Uint(2), Value::Arr(vec![Value::Bool(true), Value::Nil])),
//! ]);
//! let bytes = pack_to_vec(&value).unwrap();
//! assert_eq!(unpack_value(&bytes).unwrap(), value);
//! ```

mod error;
mod limits;
mod pack;
mod unpack;
mod value;
mod walk;

pub use error::{PackError, PackResult, Role, UnpackError, UnpackResult};
pub use limits::Limits;
pub use pack::{Packer, PatchHandle};
pub use unpack::{Extract, KeyExtract, Unpacker};
pub use value::{Value, ValueKind};
pub use walk::{pack_to_vec, pack_value, unpack_value, unpack_value_with_limits};
