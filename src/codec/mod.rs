mod classify;
mod decode;
mod encode;
mod error;
mod homogeneity;
mod keys;
mod layout;
mod registry;
mod scope;
mod value;

/// Value classification into category, kind, and exact tag.
pub use classify::{Category, Class, Kind, classify, tag_of};
/// Container-to-value decoding entry points and options.
pub use decode::{UnpackOptions, decode, unpack, unpack_with};
/// Value-to-container encoding entry points and options.
pub use encode::{PackOptions, encode, pack, pack_with};
/// Encode and decode error families.
pub use error::{DecodeError, EncodeError};
/// Flat-buffer eligibility checks.
pub use homogeneity::{Uniformity, is_homogeneous, is_homogeneous_mapping, uniformity};
/// Node-name codec for indices and mapping keys.
pub use keys::{IndexSetError, decode_index, decode_key, encode_index, encode_key, key_order, validate_index_set};
/// Reserved node and attribute names.
pub use layout::{ATTR_COLLECTION_TYPE, ATTR_DATA_TYPE, ATTR_HOMOGENEOUS, ENTRY_VALUE, KEYS, ROOT_NAME, VALS};
/// Type tag registry.
pub use registry::{ElementStorage, TypeTag, UnknownTag};
/// Packable value model.
pub use value::{Element, F16, Float, Int, Mapping, NdArray, SeqKind, Value};
