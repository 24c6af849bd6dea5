//! Pack nested values into a self-describing hierarchical container and read them back.
//!
//! ```no_run
//! use nestpack::{Value, pack, unpack};
//!
//! let value = Value::dict([(Value::from("xs"), Value::list([Value::from(1), Value::from(2)]))]);
//! pack(&value, "data.np", true)?;
//! assert_eq!(unpack("data.np")?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Type-tagged recursive encode/decode of values.
pub mod codec;
/// Hierarchical container: groups, datasets, attributes, and the file format.
pub mod store;

pub use codec::{DecodeError, EncodeError, PackOptions, UnpackOptions, Value, pack, pack_with, unpack, unpack_with};
