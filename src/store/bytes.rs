use crate::store::{Result, StoreError};

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(StoreError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		let raw = self.read_exact(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_le_bytes(buf))
	}

	/// Read a `u64` length field and narrow it to `usize`.
	pub fn read_len_u64(&mut self) -> Result<usize> {
		let at = self.pos;
		let len = self.read_u64_le()?;
		usize::try_from(len).map_err(|_| StoreError::LengthOutOfRange { len, at })
	}

	/// Read a `u32`-prefixed byte string.
	pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
		let len = self.read_u32_le()? as usize;
		self.read_exact(len)
	}

	/// Read a `u32`-prefixed UTF-8 string.
	pub fn read_prefixed_str(&mut self) -> Result<&'a str> {
		let at = self.pos;
		let raw = self.read_prefixed_bytes()?;
		std::str::from_utf8(raw).map_err(|_| StoreError::InvalidText { at })
	}
}

/// Append-only little-endian byte sink.
#[derive(Default)]
pub struct Writer {
	out: Vec<u8>,
}

impl Writer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.out
	}

	pub fn put_bytes(&mut self, bytes: &[u8]) {
		self.out.extend_from_slice(bytes);
	}

	pub fn put_u8(&mut self, value: u8) {
		self.out.push(value);
	}

	pub fn put_u32_le(&mut self, value: u32) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	pub fn put_u64_le(&mut self, value: u64) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	/// Write a `u32` length prefix followed by the bytes.
	pub fn put_prefixed(&mut self, bytes: &[u8]) {
		self.put_u32_le(bytes.len() as u32);
		self.put_bytes(bytes);
	}
}

#[cfg(test)]
mod tests {
	use super::{Cursor, Writer};
	use crate::store::StoreError;

	#[test]
	fn prefixed_strings_round_trip_through_cursor() {
		let mut writer = Writer::new();
		writer.put_prefixed(b"keys");
		writer.put_u64_le(7);
		let bytes = writer.into_bytes();

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_prefixed_str().expect("name"), "keys");
		assert_eq!(cursor.read_len_u64().expect("len"), 7);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn short_read_reports_offset() {
		let bytes = [1_u8, 2];
		let mut cursor = Cursor::new(&bytes);
		let _ = cursor.read_u8().expect("first byte");

		let err = cursor.read_u32_le().expect_err("only one byte left");
		assert!(matches!(err, StoreError::UnexpectedEof { at: 1, need: 4, rem: 1 }));
	}

	#[test]
	fn invalid_utf8_name_is_rejected() {
		let mut writer = Writer::new();
		writer.put_prefixed(&[0xff, 0xfe]);
		let bytes = writer.into_bytes();

		let err = Cursor::new(&bytes).read_prefixed_str().expect_err("not utf-8");
		assert!(matches!(err, StoreError::InvalidText { at: 0 }));
	}
}
