//! Node and attribute names shared by the encoder and decoder.

/// Name of the top-level value node under the container root.
pub const ROOT_NAME: &str = "root";

/// Registry tag of a primitive, or of a flat collection's elements.
pub const ATTR_DATA_TYPE: &str = "data_type";
/// Registry tag of a sequence or mapping node.
pub const ATTR_COLLECTION_TYPE: &str = "collection_type";
/// Boolean: whether a collection is stored as flat buffers.
pub const ATTR_HOMOGENEOUS: &str = "homogeneous";

/// Flat key buffer of a homogeneous mapping.
pub const KEYS: &str = "keys";
/// Flat value buffer of a homogeneous dict.
pub const VALS: &str = "vals";
/// Value child of an expanded mapping entry.
pub const ENTRY_VALUE: &str = "val";
