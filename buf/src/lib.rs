//! Byte buffers backing the valpak packer.
//!
//! This crate provides the two destinations an encode can write into:
//! [`GrowBuf`], an owned buffer that grows in fixed-size blocks, and
//! [`StreamBuf`], a fixed-capacity buffer that hands full blocks to a
//! caller-supplied flush callback instead of growing.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Amortized growth** - `GrowBuf` grows by whole blocks, never byte-by-byte.
//! - **Explicit errors** - Allocation ceilings and flush failures return
//!   structured errors, never panic.
//! - **No domain knowledge** - This crate knows nothing about tags or values.
//!
//! # Example
//!
//! ```
//! use buf::GrowBuf;
//!
//! let mut buf = GrowBuf::new().unwrap();
//! buf.put(&[0xAB, 0xCD]).unwrap();
//! assert_eq!(buf.as_slice(), &[0xAB, 0xCD]);
//! ```

mod error;
mod grow;
mod stream;

pub use error::{BufError, BufResult};
pub use grow::{GrowBuf, DEFAULT_BLOCK_SIZE, MIN_BLOCK_SIZE};
pub use stream::StreamBuf;
