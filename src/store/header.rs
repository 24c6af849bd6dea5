use crate::store::{Result, StoreError};

/// Container file magic.
pub const MAGIC: &[u8; 8] = b"NESTPACK";

/// Parsed container file header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
	/// Total file header size in bytes.
	pub header_size: usize,
	/// Container format version.
	pub format_version: u16,
}

impl ContainerHeader {
	/// Size of the header written by this version.
	pub const SIZE: usize = 14;
	/// Format version written by this version.
	pub const FORMAT_VERSION: u16 = 1;

	/// Header describing the current format.
	pub fn current() -> Self {
		Self {
			header_size: Self::SIZE,
			format_version: Self::FORMAT_VERSION,
		}
	}

	/// Parse a header from the beginning of `bytes`.
	///
	/// Layout: `NESTPACK`, two header-size digits, `-`, two format-version
	/// digits, then the endianness marker `v` (little-endian).
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::SIZE).ok_or(StoreError::InvalidHeader)?;
		if &header[0..8] != MAGIC {
			return Err(StoreError::InvalidHeader);
		}

		let header_size = parse_digits(&header[8..10]).ok_or(StoreError::InvalidHeader)? as usize;
		if header_size < Self::SIZE {
			return Err(StoreError::InvalidHeader);
		}

		if bytes.len() < header_size {
			return Err(StoreError::UnexpectedEof {
				at: bytes.len(),
				need: header_size - bytes.len(),
				rem: 0,
			});
		}

		if header[10] != b'-' {
			return Err(StoreError::InvalidHeader);
		}

		let format_version = parse_digits(&header[11..13]).ok_or(StoreError::InvalidHeader)?;
		if format_version != Self::FORMAT_VERSION {
			return Err(StoreError::UnsupportedFormatVersion { version: format_version });
		}

		if header[13] != b'v' {
			return Err(StoreError::BigEndianUnsupported);
		}

		Ok(Self {
			header_size,
			format_version,
		})
	}

	/// Render the header bytes.
	pub fn to_bytes(self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.header_size);
		out.extend_from_slice(MAGIC);
		out.extend_from_slice(format!("{:02}-{:02}v", self.header_size, self.format_version).as_bytes());
		out
	}
}

fn parse_digits(bytes: &[u8]) -> Option<u16> {
	if bytes.is_empty() {
		return None;
	}

	let mut value = 0_u16;
	for byte in bytes {
		if !byte.is_ascii_digit() {
			return None;
		}
		value = value * 10 + u16::from(*byte - b'0');
	}
	Some(value)
}

#[cfg(test)]
mod tests {
	use super::ContainerHeader;
	use crate::store::StoreError;

	#[test]
	fn current_header_round_trips() {
		let bytes = ContainerHeader::current().to_bytes();
		assert_eq!(bytes, b"NESTPACK14-01v");
		assert_eq!(ContainerHeader::parse(&bytes).expect("parses"), ContainerHeader::current());
	}

	#[test]
	fn rejects_future_format_version() {
		let err = ContainerHeader::parse(b"NESTPACK14-02v").expect_err("version 2 is unknown");
		assert!(matches!(err, StoreError::UnsupportedFormatVersion { version: 2 }));
	}

	#[test]
	fn rejects_big_endian_marker() {
		let err = ContainerHeader::parse(b"NESTPACK14-01V").expect_err("big endian");
		assert!(matches!(err, StoreError::BigEndianUnsupported));
	}

	#[test]
	fn rejects_short_or_foreign_input() {
		assert!(matches!(ContainerHeader::parse(b"NEST"), Err(StoreError::InvalidHeader)));
		assert!(matches!(ContainerHeader::parse(b"BLENDER17-01v0500"), Err(StoreError::InvalidHeader)));
	}
}
