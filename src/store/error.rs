use thiserror::Error;

/// Crate-local result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced while building, writing, or reading a container.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Unknown leading file magic.
	#[error("unsupported compression or not a nestpack container (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompressed stream did not start with `NESTPACK`.
	#[error("decompressed data does not start with NESTPACK magic")]
	NotContainerAfterDecompress,
	/// Invalid or malformed file header.
	#[error("invalid header")]
	InvalidHeader,
	/// Endianness marker is not little-endian.
	#[error("unsupported endianness (expected little-endian 'v')")]
	BigEndianUnsupported,
	/// Unsupported container format version.
	#[error("unsupported file format version {version} (expected 1)")]
	UnsupportedFormatVersion {
		/// Parsed format version.
		version: u16,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Record code is not one of `GRUP`, `DSET`, `ENDB` where expected.
	#[error("unexpected record code {code:?} at offset {at}")]
	BadRecordCode {
		/// Parsed 4-byte code.
		code: [u8; 4],
		/// Record file offset.
		at: usize,
	},
	/// Container did not end with an `ENDB` record.
	#[error("missing ENDB record")]
	MissingEndRecord,
	/// Bytes remained after the `ENDB` record.
	#[error("trailing data after ENDB: {len} bytes")]
	TrailingData {
		/// Unconsumed byte count.
		len: usize,
	},
	/// Unknown dataset element type code.
	#[error("unknown dtype code {code} at offset {at}")]
	UnknownDtype {
		/// Parsed dtype code.
		code: u8,
		/// Byte offset of the code.
		at: usize,
	},
	/// Unknown dataset filter code.
	#[error("unknown filter code {code} at offset {at}")]
	UnknownFilter {
		/// Parsed filter code.
		code: u8,
		/// Byte offset of the code.
		at: usize,
	},
	/// Unknown attribute value code.
	#[error("unknown attribute code {code} at offset {at}")]
	UnknownAttr {
		/// Parsed attribute value code.
		code: u8,
		/// Byte offset of the code.
		at: usize,
	},
	/// Node name or text attribute was not valid UTF-8.
	#[error("invalid utf-8 text at offset {at}")]
	InvalidText {
		/// Byte offset of the text.
		at: usize,
	},
	/// Buffer length does not agree with dataset shape.
	#[error("dataset {name}: shape {shape:?} needs {expected} elements/bytes, buffer has {actual}")]
	ShapeMismatch {
		/// Dataset name.
		name: String,
		/// Declared shape.
		shape: Vec<usize>,
		/// Required length.
		expected: usize,
		/// Actual length.
		actual: usize,
	},
	/// A child with this name already exists in the group.
	#[error("node already exists: {name}")]
	NodeExists {
		/// Conflicting child name.
		name: String,
	},
	/// A freshly inserted child is not of the requested kind.
	#[error("node {name} is not a {expected}")]
	WrongNodeKind {
		/// Child name.
		name: String,
		/// Requested node kind.
		expected: &'static str,
	},
	/// Length field does not fit in memory on this platform.
	#[error("length {len} out of range at offset {at}")]
	LengthOutOfRange {
		/// Declared length.
		len: u64,
		/// Byte offset of the length field.
		at: usize,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Nested group records exceeded the parse depth limit.
	#[error("group nesting depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
}
