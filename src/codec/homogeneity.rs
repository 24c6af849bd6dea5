use crate::codec::classify::classify;
use crate::codec::{Mapping, TypeTag, Value};

/// Outcome of checking a run of values for one shared scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniformity {
	/// No values at all.
	Empty,
	/// Every value has this scalar tag.
	Uniform(TypeTag),
	/// Types differ, or some value is an array or a collection.
	Mixed,
}

impl Uniformity {
	/// Whether the run fits in one flat buffer.
	pub fn is_flat(self) -> bool {
		!matches!(self, Self::Mixed)
	}

	/// Shared tag, falling back to `empty` for an empty run.
	pub fn tag_or(self, empty: TypeTag) -> Option<TypeTag> {
		match self {
			Self::Empty => Some(empty),
			Self::Uniform(tag) => Some(tag),
			Self::Mixed => None,
		}
	}
}

/// Check whether `values` share one scalar `(category, kind, subtype)`.
pub fn uniformity<'v>(values: impl IntoIterator<Item = &'v Value>) -> Uniformity {
	let mut shared = None;
	for value in values {
		let class = classify(value);
		if !class.is_scalar() {
			return Uniformity::Mixed;
		}
		match shared {
			None => shared = Some(class),
			Some(first) if first != class => return Uniformity::Mixed,
			Some(_) => {}
		}
	}
	match shared {
		None => Uniformity::Empty,
		Some(class) => Uniformity::Uniform(class.tag),
	}
}

/// Sequence test: all items share one scalar type. Empty sequences qualify.
pub fn is_homogeneous(items: &[Value]) -> bool {
	uniformity(items).is_flat()
}

/// Mapping test: keys share one type, and for a `Dict` values share one scalar type.
pub fn is_homogeneous_mapping(mapping: &Mapping) -> bool {
	match mapping {
		Mapping::Dict(entries) => {
			uniformity(entries.iter().map(|(key, _)| key)).is_flat() && uniformity(entries.iter().map(|(_, value)| value)).is_flat()
		}
		Mapping::Set(keys) => uniformity(keys).is_flat(),
	}
}

#[cfg(test)]
mod tests {
	use super::{Uniformity, is_homogeneous, is_homogeneous_mapping, uniformity};
	use crate::codec::{Int, Mapping, NdArray, TypeTag, Value};

	#[test]
	fn same_scalar_kind_is_homogeneous() {
		assert!(is_homogeneous(&[Value::from(1), Value::from(2), Value::from(3)]));
		assert!(is_homogeneous(&[Value::from("a"), Value::from("bc")]));
		assert!(is_homogeneous(&[Value::Null, Value::Null]));
		assert_eq!(uniformity(&[Value::Bool(true), Value::Bool(false)]), Uniformity::Uniform(TypeTag::Bool));
	}

	#[test]
	fn empty_sequence_is_homogeneous() {
		assert!(is_homogeneous(&[]));
		assert_eq!(uniformity(Vec::<Value>::new().iter()), Uniformity::Empty);
	}

	#[test]
	fn mixed_kinds_or_widths_are_heterogeneous() {
		assert!(!is_homogeneous(&[Value::from(1), Value::from("a")]));
		assert!(!is_homogeneous(&[Value::from(1), Value::Bool(true)]));
		assert!(!is_homogeneous(&[Value::from(1), Value::Int(Int::I32(2))]));
	}

	#[test]
	fn nested_collections_never_flatten() {
		assert!(!is_homogeneous(&[Value::list([Value::from(1)]), Value::list([Value::from(2)])]));
		assert!(!is_homogeneous(&[Value::list([])]));
	}

	#[test]
	fn arrays_never_flatten() {
		let array = NdArray::from_elements(vec![3], &[1.0_f64, 2.0, 3.0]).expect("fits");
		assert!(!is_homogeneous(&[Value::Array(array.clone()), Value::Array(array)]));
	}

	#[test]
	fn mapping_checks_keys_and_values() {
		let flat = Mapping::Dict(vec![(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(2))]);
		assert!(is_homogeneous_mapping(&flat));

		let mixed_values = Mapping::Dict(vec![(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from("x"))]);
		assert!(!is_homogeneous_mapping(&mixed_values));

		let nested_value = Mapping::Dict(vec![(Value::from("a"), Value::list([Value::from(1)]))]);
		assert!(!is_homogeneous_mapping(&nested_value));

		let mixed_keys = Mapping::Dict(vec![(Value::from(1), Value::from(1)), (Value::from("b"), Value::from(2))]);
		assert!(!is_homogeneous_mapping(&mixed_keys));
	}

	#[test]
	fn set_ignores_value_dimension() {
		assert!(is_homogeneous_mapping(&Mapping::Set(vec![Value::from(1), Value::from(2)])));
		assert!(!is_homogeneous_mapping(&Mapping::Set(vec![Value::from(1), Value::from("a")])));
		assert!(is_homogeneous_mapping(&Mapping::Set(Vec::new())));
	}
}
