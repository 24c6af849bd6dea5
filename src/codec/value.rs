use std::fmt;

use crate::store::Dtype;

/// In-memory datum that can be packed into a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value.
	Null,
	/// Boolean; never conflated with integers.
	Bool(bool),
	/// Native or fixed-width integer.
	Int(Int),
	/// Native or fixed-width float.
	Float(Float),
	/// UTF-8 text.
	String(String),
	/// Atomic n-dimensional numeric buffer.
	Array(NdArray),
	/// Ordered items.
	Sequence(SeqKind, Vec<Value>),
	/// Keyed entries.
	Mapping(Mapping),
}

impl Value {
	/// Build a `List`.
	pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
		Self::Sequence(SeqKind::List, items.into_iter().collect())
	}

	/// Build a `Tuple`.
	pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
		Self::Sequence(SeqKind::Tuple, items.into_iter().collect())
	}

	/// Build a `Dict`.
	pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
		Self::Mapping(Mapping::Dict(entries.into_iter().collect()))
	}

	/// Build a `Set`.
	pub fn set(keys: impl IntoIterator<Item = Value>) -> Self {
		Self::Mapping(Mapping::Set(keys.into_iter().collect()))
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

/// Native default integer.
impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(Int::Native(value))
	}
}

/// Native default float.
impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(Float::Native(value))
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<Int> for Value {
	fn from(value: Int) -> Self {
		Self::Int(value)
	}
}

impl From<Float> for Value {
	fn from(value: Float) -> Self {
		Self::Float(value)
	}
}

impl From<NdArray> for Value {
	fn from(value: NdArray) -> Self {
		Self::Array(value)
	}
}

/// Integer with its declared width and signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Int {
	/// Native default integer, stored as 64-bit signed.
	Native(i64),
	/// `int8`.
	I8(i8),
	/// `int16`.
	I16(i16),
	/// `int32`.
	I32(i32),
	/// `int64`.
	I64(i64),
	/// `uint8`.
	U8(u8),
	/// `uint16`.
	U16(u16),
	/// `uint32`.
	U32(u32),
	/// `uint64`.
	U64(u64),
}

impl Int {
	/// Widen to `i128`, which holds every variant exactly.
	pub fn to_i128(self) -> i128 {
		match self {
			Self::Native(v) | Self::I64(v) => i128::from(v),
			Self::I8(v) => i128::from(v),
			Self::I16(v) => i128::from(v),
			Self::I32(v) => i128::from(v),
			Self::U8(v) => i128::from(v),
			Self::U16(v) => i128::from(v),
			Self::U32(v) => i128::from(v),
			Self::U64(v) => i128::from(v),
		}
	}

	pub(crate) fn put_le(self, out: &mut Vec<u8>) {
		match self {
			Self::Native(v) | Self::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::I8(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::U8(v) => out.push(v),
			Self::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
		}
	}
}

impl fmt::Display for Int {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_i128())
	}
}

/// Float with its declared width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Float {
	/// Native default float, stored as 64-bit.
	Native(f64),
	/// `float16`.
	F16(F16),
	/// `float32`.
	F32(f32),
	/// `float64`.
	F64(f64),
}

impl Float {
	/// Widen to `f64`.
	pub fn to_f64(self) -> f64 {
		match self {
			Self::Native(v) | Self::F64(v) => v,
			Self::F16(v) => f64::from(v.to_f32()),
			Self::F32(v) => f64::from(v),
		}
	}

	pub(crate) fn put_le(self, out: &mut Vec<u8>) {
		match self {
			Self::Native(v) | Self::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
			Self::F16(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
			Self::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
		}
	}
}

/// IEEE-754 binary16 value carried as its bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct F16(u16);

impl F16 {
	/// Wrap raw binary16 bits.
	pub const fn from_bits(bits: u16) -> Self {
		Self(bits)
	}

	/// Raw binary16 bits.
	pub const fn to_bits(self) -> u16 {
		self.0
	}

	/// Exact conversion to `f32`.
	pub fn to_f32(self) -> f32 {
		let sign = u32::from(self.0 >> 15) << 31;
		let exp = u32::from((self.0 >> 10) & 0x1f);
		let man = u32::from(self.0 & 0x3ff);

		let bits = match (exp, man) {
			(0, 0) => sign,
			(0, _) => {
				// Subnormal: value is man * 2^-24.
				let value = man as f32 * f32::from_bits(0x3380_0000);
				return if sign == 0 { value } else { -value };
			}
			(0x1f, 0) => sign | 0x7f80_0000,
			(0x1f, _) => sign | 0x7fc0_0000 | (man << 13),
			_ => sign | ((exp + 127 - 15) << 23) | (man << 13),
		};
		f32::from_bits(bits)
	}
}

/// Ordering flavor of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
	/// Mutable-list flavor.
	List,
	/// Fixed-tuple flavor.
	Tuple,
}

/// Keyed collection. Keys must be `Int` or `String` values to be packable.
#[derive(Debug, Clone)]
pub enum Mapping {
	/// Key/value entries.
	Dict(Vec<(Value, Value)>),
	/// Keys only.
	Set(Vec<Value>),
}

impl Mapping {
	/// Number of entries.
	pub fn len(&self) -> usize {
		match self {
			Self::Dict(entries) => entries.len(),
			Self::Set(keys) => keys.len(),
		}
	}

	/// Whether the mapping has no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterate keys in stored order.
	pub fn keys(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
		match self {
			Self::Dict(entries) => Box::new(entries.iter().map(|(key, _)| key)),
			Self::Set(keys) => Box::new(keys.iter()),
		}
	}

	/// Look up the value stored under `key` in a `Dict`.
	pub fn get(&self, key: &Value) -> Option<&Value> {
		match self {
			Self::Dict(entries) => entries.iter().find(|(item, _)| item == key).map(|(_, value)| value),
			Self::Set(_) => None,
		}
	}
}

/// Unordered comparison: entries match regardless of position.
impl PartialEq for Mapping {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Dict(left), Self::Dict(right)) => {
				left.len() == right.len()
					&& left.iter().all(|(key, value)| other.get(key) == Some(value))
					&& right.iter().all(|(key, value)| self.get(key) == Some(value))
			}
			(Self::Set(left), Self::Set(right)) => {
				left.len() == right.len() && left.iter().all(|key| right.contains(key)) && right.iter().all(|key| left.contains(key))
			}
			_ => false,
		}
	}
}

/// Multi-dimensional homogeneous numeric buffer, kept as one atomic leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
	dtype: Dtype,
	shape: Vec<usize>,
	bytes: Vec<u8>,
}

impl NdArray {
	/// Wrap raw little-endian elements; `None` when `bytes` does not fill `shape`.
	pub fn new(dtype: Dtype, shape: Vec<usize>, bytes: Vec<u8>) -> Option<Self> {
		let count = shape.iter().try_fold(1_usize, |acc, dim| acc.checked_mul(*dim))?;
		if count.checked_mul(dtype.width())? != bytes.len() {
			return None;
		}
		Some(Self { dtype, shape, bytes })
	}

	/// Build from typed elements; `None` when `items` does not fill `shape`.
	pub fn from_elements<T: Element>(shape: Vec<usize>, items: &[T]) -> Option<Self> {
		let mut bytes = Vec::with_capacity(items.len() * T::DTYPE.width());
		for item in items {
			item.put_le(&mut bytes);
		}
		Self::new(T::DTYPE, shape, bytes)
	}

	/// Element type.
	pub fn dtype(&self) -> Dtype {
		self.dtype
	}

	/// Dimensions.
	pub fn shape(&self) -> &[usize] {
		&self.shape
	}

	/// Raw little-endian elements.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.bytes.len() / self.dtype.width()
	}

	/// Whether the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Decode elements as `T`; `None` when `T` is not the stored dtype.
	pub fn to_vec<T: Element>(&self) -> Option<Vec<T>> {
		if T::DTYPE != self.dtype {
			return None;
		}
		Some(self.bytes.chunks_exact(self.dtype.width()).map(T::read_le).collect())
	}

	/// Widen every element to `f64`, for display.
	pub fn to_f64_vec(&self) -> Vec<f64> {
		self.bytes
			.chunks_exact(self.dtype.width())
			.map(|chunk| match self.dtype {
				Dtype::Bool => f64::from(chunk[0]),
				Dtype::I8 => f64::from(<i8 as Element>::read_le(chunk)),
				Dtype::I16 => f64::from(<i16 as Element>::read_le(chunk)),
				Dtype::I32 => f64::from(<i32 as Element>::read_le(chunk)),
				Dtype::I64 => <i64 as Element>::read_le(chunk) as f64,
				Dtype::U8 => f64::from(chunk[0]),
				Dtype::U16 => f64::from(<u16 as Element>::read_le(chunk)),
				Dtype::U32 => f64::from(<u32 as Element>::read_le(chunk)),
				Dtype::U64 => <u64 as Element>::read_le(chunk) as f64,
				Dtype::F16 => f64::from(F16::from_bits(<u16 as Element>::read_le(chunk)).to_f32()),
				Dtype::F32 => f64::from(<f32 as Element>::read_le(chunk)),
				Dtype::F64 => <f64 as Element>::read_le(chunk),
			})
			.collect()
	}
}

/// Fixed-width element usable in an [`NdArray`].
pub trait Element: Copy {
	/// Matching dataset dtype.
	const DTYPE: Dtype;

	/// Append little-endian bytes.
	fn put_le(self, out: &mut Vec<u8>);

	/// Read from exactly `DTYPE.width()` little-endian bytes.
	fn read_le(chunk: &[u8]) -> Self;
}

macro_rules! impl_element {
	($($ty:ty => $dtype:ident),* $(,)?) => {
		$(
			impl Element for $ty {
				const DTYPE: Dtype = Dtype::$dtype;

				fn put_le(self, out: &mut Vec<u8>) {
					out.extend_from_slice(&self.to_le_bytes());
				}

				fn read_le(chunk: &[u8]) -> Self {
					let mut buf = [0_u8; std::mem::size_of::<$ty>()];
					buf.copy_from_slice(chunk);
					<$ty>::from_le_bytes(buf)
				}
			}
		)*
	};
}

impl_element!(
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	f32 => F32,
	f64 => F64,
);

#[cfg(test)]
mod tests {
	use super::{F16, Int, NdArray, Value};
	use crate::store::Dtype;

	#[test]
	fn dict_equality_ignores_entry_order() {
		let left = Value::dict([(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(2))]);
		let right = Value::dict([(Value::from("b"), Value::from(2)), (Value::from("a"), Value::from(1))]);
		assert_eq!(left, right);

		let other = Value::dict([(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(3))]);
		assert_ne!(left, other);
	}

	#[test]
	fn dict_equality_holds_both_ways_with_repeated_keys() {
		let repeated = Value::dict([(Value::from("a"), Value::from(1)), (Value::from("a"), Value::from(1))]);
		let distinct = Value::dict([(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(2))]);
		assert_ne!(repeated, distinct);
		assert_ne!(distinct, repeated);
	}

	#[test]
	fn collection_kinds_and_key_types_stay_distinct() {
		assert_ne!(Value::list([Value::from(1)]), Value::tuple([Value::from(1)]));
		assert_ne!(Value::dict([]), Value::set([]));
		assert_ne!(Value::set([Value::from(1)]), Value::set([Value::from("1")]));
		assert_ne!(Value::from(1), Value::Bool(true));
	}

	#[test]
	fn f16_converts_exactly() {
		assert_eq!(F16::from_bits(0x3C00).to_f32(), 1.0);
		assert_eq!(F16::from_bits(0xC000).to_f32(), -2.0);
		assert_eq!(F16::from_bits(0x7BFF).to_f32(), 65504.0);
		assert_eq!(F16::from_bits(0x0001).to_f32(), 2.0_f32.powi(-24));
		assert!(F16::from_bits(0x7C00).to_f32().is_infinite());
		assert!(F16::from_bits(0x7E00).to_f32().is_nan());
	}

	#[test]
	fn ndarray_rejects_mismatched_shape() {
		assert!(NdArray::from_elements(vec![2, 4], &[0.0_f64; 8]).is_some());
		assert!(NdArray::from_elements(vec![2, 4], &[0.0_f64; 7]).is_none());
		assert!(NdArray::new(Dtype::I16, vec![3], vec![0; 5]).is_none());
	}

	#[test]
	fn ndarray_typed_access_checks_dtype() {
		let array = NdArray::from_elements(vec![3], &[1_i32, -2, 3]).expect("fits");
		assert_eq!(array.to_vec::<i32>(), Some(vec![1, -2, 3]));
		assert_eq!(array.to_vec::<u32>(), None);
		assert_eq!(array.to_f64_vec(), vec![1.0, -2.0, 3.0]);
	}

	#[test]
	fn int_display_is_decimal() {
		assert_eq!(Int::I8(-5).to_string(), "-5");
		assert_eq!(Int::U64(u64::MAX).to_string(), "18446744073709551615");
	}
}
