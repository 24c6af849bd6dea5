use crate::codec::{Float, Int, Mapping, SeqKind, TypeTag, Value};

/// Broad storage category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// Stored as one leaf (scalars and numeric arrays).
	Primitive,
	/// Sequences and mappings.
	Collection,
}

/// Value kind without numeric width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// Absent value.
	Null,
	/// Boolean.
	Bool,
	/// Any integer width.
	Int,
	/// Any float width.
	Float,
	/// Text.
	String,
	/// Numeric array.
	Array,
	/// Ordered list.
	List,
	/// Ordered tuple.
	Tuple,
	/// Keyed dict.
	Dict,
	/// Key set.
	Set,
}

/// Result of classifying one value: `(category, kind, subtype)`.
///
/// `tag` is the exact registry tag, so it doubles as the numeric subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Class {
	/// Primitive or collection.
	pub category: Category,
	/// Kind ignoring width.
	pub kind: Kind,
	/// Exact registry tag.
	pub tag: TypeTag,
}

impl Class {
	/// A scalar kind that can live in a flat buffer.
	pub fn is_scalar(self) -> bool {
		self.category == Category::Primitive && self.kind != Kind::Array
	}
}

/// Classify a value by its declared kind and width.
pub fn classify(value: &Value) -> Class {
	let tag = tag_of(value);
	let (category, kind) = match tag {
		TypeTag::Null => (Category::Primitive, Kind::Null),
		TypeTag::Bool => (Category::Primitive, Kind::Bool),
		TypeTag::String => (Category::Primitive, Kind::String),
		TypeTag::Array => (Category::Primitive, Kind::Array),
		TypeTag::List => (Category::Collection, Kind::List),
		TypeTag::Tuple => (Category::Collection, Kind::Tuple),
		TypeTag::Dict => (Category::Collection, Kind::Dict),
		TypeTag::Set => (Category::Collection, Kind::Set),
		TypeTag::Float | TypeTag::Float16 | TypeTag::Float32 | TypeTag::Float64 => (Category::Primitive, Kind::Float),
		TypeTag::Int
		| TypeTag::Int8
		| TypeTag::Int16
		| TypeTag::Int32
		| TypeTag::Int64
		| TypeTag::Uint8
		| TypeTag::Uint16
		| TypeTag::Uint32
		| TypeTag::Uint64 => (Category::Primitive, Kind::Int),
	};
	Class { category, kind, tag }
}

/// Exact registry tag of a value.
pub fn tag_of(value: &Value) -> TypeTag {
	match value {
		Value::Null => TypeTag::Null,
		Value::Bool(_) => TypeTag::Bool,
		Value::Int(item) => int_tag(*item),
		Value::Float(item) => float_tag(*item),
		Value::String(_) => TypeTag::String,
		Value::Array(_) => TypeTag::Array,
		Value::Sequence(SeqKind::List, _) => TypeTag::List,
		Value::Sequence(SeqKind::Tuple, _) => TypeTag::Tuple,
		Value::Mapping(Mapping::Dict(_)) => TypeTag::Dict,
		Value::Mapping(Mapping::Set(_)) => TypeTag::Set,
	}
}

fn int_tag(value: Int) -> TypeTag {
	match value {
		Int::Native(_) => TypeTag::Int,
		Int::I8(_) => TypeTag::Int8,
		Int::I16(_) => TypeTag::Int16,
		Int::I32(_) => TypeTag::Int32,
		Int::I64(_) => TypeTag::Int64,
		Int::U8(_) => TypeTag::Uint8,
		Int::U16(_) => TypeTag::Uint16,
		Int::U32(_) => TypeTag::Uint32,
		Int::U64(_) => TypeTag::Uint64,
	}
}

fn float_tag(value: Float) -> TypeTag {
	match value {
		Float::Native(_) => TypeTag::Float,
		Float::F16(_) => TypeTag::Float16,
		Float::F32(_) => TypeTag::Float32,
		Float::F64(_) => TypeTag::Float64,
	}
}

#[cfg(test)]
mod tests {
	use super::{Category, Kind, classify};
	use crate::codec::{F16, Float, Int, NdArray, TypeTag, Value};

	#[test]
	fn bool_and_null_are_not_integers() {
		let class = classify(&Value::Bool(true));
		assert_eq!((class.category, class.kind, class.tag), (Category::Primitive, Kind::Bool, TypeTag::Bool));
		assert_eq!(classify(&Value::Null).kind, Kind::Null);
		assert_ne!(classify(&Value::Bool(true)), classify(&Value::from(1)));
	}

	#[test]
	fn numeric_subtype_comes_from_declared_width() {
		assert_eq!(classify(&Value::Int(Int::U8(200))).tag, TypeTag::Uint8);
		assert_eq!(classify(&Value::Int(Int::I64(1))).tag, TypeTag::Int64);
		assert_eq!(classify(&Value::from(1)).tag, TypeTag::Int);
		assert_eq!(classify(&Value::Float(Float::F16(F16::from_bits(0x3C00)))).tag, TypeTag::Float16);
		assert_eq!(classify(&Value::from(1.5)).tag, TypeTag::Float);

		assert_eq!(classify(&Value::Int(Int::I8(1))).kind, classify(&Value::Int(Int::U64(1))).kind);
		assert_ne!(classify(&Value::Int(Int::I8(1))), classify(&Value::Int(Int::U64(1))));
	}

	#[test]
	fn arrays_are_primitive_but_not_scalar() {
		let array = NdArray::from_elements(vec![2], &[1.0_f32, 2.0]).expect("fits");
		let class = classify(&Value::Array(array));
		assert_eq!(class.category, Category::Primitive);
		assert!(!class.is_scalar());
		assert!(classify(&Value::from("x")).is_scalar());
	}

	#[test]
	fn collections_are_classified_by_kind() {
		assert_eq!(classify(&Value::list([])).category, Category::Collection);
		assert_eq!(classify(&Value::tuple([])).tag, TypeTag::Tuple);
		assert_eq!(classify(&Value::dict([])).kind, Kind::Dict);
		assert_eq!(classify(&Value::set([])).kind, Kind::Set);
	}
}
