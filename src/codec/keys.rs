//! Node-name codec for sequence indices and mapping keys.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::codec::classify::tag_of;
use crate::codec::{Int, TypeTag, Value};

/// Why a set of child names is not `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexSetError {
	/// A name is not a canonical non-negative decimal integer.
	#[error("child name {0:?} is not an index")]
	NotAnIndex(String),
	/// The parsed indices skip `missing`.
	#[error("index {missing} is missing")]
	Gap {
		/// First absent index.
		missing: usize,
	},
}

/// Decimal node name for a sequence position.
pub fn encode_index(index: usize) -> String {
	index.to_string()
}

/// Parse a canonical decimal index (`"0"`, `"17"`; not `"01"`, `"+1"`, `"-0"`).
pub fn decode_index(name: &str) -> Option<usize> {
	if !is_canonical_digits(name) {
		return None;
	}
	name.parse().ok()
}

fn is_canonical_digits(digits: &str) -> bool {
	!digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) && (digits == "0" || !digits.starts_with('0'))
}

/// Decimal integer text exactly as `Int` displays it: one optional `-`, no `-0`.
fn is_canonical_integer(name: &str) -> bool {
	match name.strip_prefix('-') {
		Some(digits) => digits != "0" && is_canonical_digits(digits),
		None => is_canonical_digits(name),
	}
}

/// Check that `names` are exactly `"0"..="n-1"` and return `n`.
pub fn validate_index_set<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<usize, IndexSetError> {
	let mut indices = BTreeSet::new();
	for name in names {
		let index = decode_index(name).ok_or_else(|| IndexSetError::NotAnIndex(name.to_owned()))?;
		indices.insert(index);
	}

	for (expected, index) in indices.iter().enumerate() {
		if *index != expected {
			return Err(IndexSetError::Gap { missing: expected });
		}
	}
	Ok(indices.len())
}

/// Node name for a mapping key; `None` unless the key is an `Int` or `String`.
pub fn encode_key(key: &Value) -> Option<String> {
	match key {
		Value::Int(item) => Some(item.to_string()),
		Value::String(item) => Some(item.clone()),
		_ => None,
	}
}

/// Rebuild a key from its node name using the declared key tag.
///
/// Integer tags accept canonical decimal within that subtype's range;
/// `string` passes through.
pub fn decode_key(name: &str, declared: TypeTag) -> Option<Value> {
	if declared == TypeTag::String {
		return Some(Value::String(name.to_owned()));
	}
	if !is_canonical_integer(name) {
		return None;
	}
	let key = match declared {
		TypeTag::Int => Int::Native(name.parse().ok()?),
		TypeTag::Int8 => Int::I8(name.parse().ok()?),
		TypeTag::Int16 => Int::I16(name.parse().ok()?),
		TypeTag::Int32 => Int::I32(name.parse().ok()?),
		TypeTag::Int64 => Int::I64(name.parse().ok()?),
		TypeTag::Uint8 => Int::U8(name.parse().ok()?),
		TypeTag::Uint16 => Int::U16(name.parse().ok()?),
		TypeTag::Uint32 => Int::U32(name.parse().ok()?),
		TypeTag::Uint64 => Int::U64(name.parse().ok()?),
		_ => return None,
	};
	Some(Value::Int(key))
}

/// Order two keys of the same tag; `None` when they are not mutually ordered.
pub fn key_order(left: &Value, right: &Value) -> Option<Ordering> {
	if tag_of(left) != tag_of(right) {
		return None;
	}
	match (left, right) {
		(Value::Int(a), Value::Int(b)) => Some(a.to_i128().cmp(&b.to_i128())),
		(Value::String(a), Value::String(b)) => Some(a.cmp(b)),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use std::cmp::Ordering;

	use super::{IndexSetError, decode_index, decode_key, encode_index, encode_key, key_order, validate_index_set};
	use crate::codec::{Int, TypeTag, Value};

	#[test]
	fn index_names_are_plain_decimal() {
		assert_eq!(encode_index(0), "0");
		assert_eq!(encode_index(120), "120");
		assert_eq!(decode_index("120"), Some(120));
		assert_eq!(decode_index("0"), Some(0));
	}

	#[test]
	fn non_canonical_index_names_are_rejected() {
		for name in ["", "01", "+1", "-1", "-0", "1.0", " 1", "a"] {
			assert_eq!(decode_index(name), None, "{name:?}");
		}
	}

	#[test]
	fn contiguous_index_set_is_valid_in_any_order() {
		assert_eq!(validate_index_set(["2", "0", "10", "1", "3", "4", "5", "6", "7", "8", "9"]), Ok(11));
		assert_eq!(validate_index_set(Vec::<&str>::new()), Ok(0));
	}

	#[test]
	fn gaps_and_junk_are_invalid() {
		assert_eq!(validate_index_set(["0", "2"]), Err(IndexSetError::Gap { missing: 1 }));
		assert_eq!(validate_index_set(["1"]), Err(IndexSetError::Gap { missing: 0 }));
		assert_eq!(validate_index_set(["0", "x"]), Err(IndexSetError::NotAnIndex("x".to_owned())));
		assert_eq!(validate_index_set(["0", "00"]), Err(IndexSetError::NotAnIndex("00".to_owned())));
	}

	#[test]
	fn keys_round_trip_by_declared_tag() {
		let int_key = Value::from(12);
		let name = encode_key(&int_key).expect("int key");
		assert_eq!(name, "12");
		assert_eq!(decode_key(&name, TypeTag::Int), Some(int_key));
		assert_eq!(decode_key(&name, TypeTag::String), Some(Value::from("12")));

		assert_eq!(decode_key("-3", TypeTag::Int8), Some(Value::Int(Int::I8(-3))));
		assert_eq!(decode_key("300", TypeTag::Uint8), None);
		assert_eq!(decode_key("abc", TypeTag::Int), None);
		assert_eq!(decode_key("1", TypeTag::Bool), None);
	}

	#[test]
	fn integer_keys_must_be_canonical_decimal() {
		for name in ["01", "+1", "-0", "-01", "--1", "", "-", " 1"] {
			assert_eq!(decode_key(name, TypeTag::Int), None, "{name:?}");
		}
		assert_eq!(decode_key("0", TypeTag::Int), Some(Value::from(0)));
		assert_eq!(decode_key("-10", TypeTag::Int64), Some(Value::Int(Int::I64(-10))));
		assert_eq!(decode_key("-1", TypeTag::Uint8), None);
		assert_eq!(decode_key("01", TypeTag::String), Some(Value::from("01")));
	}

	#[test]
	fn index_set_errors_render_their_cause() {
		assert_eq!(IndexSetError::NotAnIndex("x".to_owned()).to_string(), "child name \"x\" is not an index");
		assert_eq!(IndexSetError::Gap { missing: 3 }.to_string(), "index 3 is missing");
	}

	#[test]
	fn only_int_and_string_keys_encode() {
		assert_eq!(encode_key(&Value::from("a/b")), Some("a/b".to_owned()));
		assert_eq!(encode_key(&Value::Int(Int::U64(u64::MAX))), Some(u64::MAX.to_string()));
		assert_eq!(encode_key(&Value::Bool(true)), None);
		assert_eq!(encode_key(&Value::from(1.5)), None);
		assert_eq!(encode_key(&Value::Null), None);
	}

	#[test]
	fn keys_of_different_tags_are_unordered() {
		assert_eq!(key_order(&Value::from(2), &Value::from(10)), Some(Ordering::Less));
		assert_eq!(key_order(&Value::from("b"), &Value::from("a")), Some(Ordering::Greater));
		assert_eq!(key_order(&Value::from(1), &Value::from("1")), None);
		assert_eq!(key_order(&Value::from(1), &Value::Int(Int::I8(1))), None);
	}
}
