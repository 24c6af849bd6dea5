use nestpack::codec::{Element, Float, Int, Mapping, NdArray};
use nestpack::store::Dtype;
use nestpack::Value;
use serde_json::{Map, Value as JsonValue};

/// Map a JSON document onto packable values.
///
/// Integers become native `int`, other numbers native `float`, arrays lists,
/// and objects dicts with string keys.
pub(crate) fn value_from_json(json: &JsonValue) -> Value {
	match json {
		JsonValue::Null => Value::Null,
		JsonValue::Bool(flag) => Value::Bool(*flag),
		JsonValue::Number(number) => match number.as_i64() {
			Some(int) => Value::Int(Int::Native(int)),
			None => Value::Float(Float::Native(number.as_f64().unwrap_or(f64::NAN))),
		},
		JsonValue::String(text) => Value::String(text.clone()),
		JsonValue::Array(items) => Value::list(items.iter().map(value_from_json)),
		JsonValue::Object(fields) => Value::dict(fields.iter().map(|(key, item)| (Value::String(key.clone()), value_from_json(item)))),
	}
}

/// Render a value as JSON: tuples and sets as arrays, dict keys as text,
/// numeric arrays as nested lists.
pub(crate) fn value_to_json(value: &Value) -> JsonValue {
	match value {
		Value::Null => JsonValue::Null,
		Value::Bool(flag) => JsonValue::Bool(*flag),
		Value::Int(Int::U64(int)) => JsonValue::from(*int),
		Value::Int(int) => i64::try_from(int.to_i128()).map(JsonValue::from).unwrap_or(JsonValue::Null),
		Value::Float(float) => JsonValue::from(float.to_f64()),
		Value::String(text) => JsonValue::String(text.clone()),
		Value::Array(array) => nest(&array_elements(array), array.shape()),
		Value::Sequence(_, items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		Value::Mapping(Mapping::Set(keys)) => JsonValue::Array(keys.iter().map(value_to_json).collect()),
		Value::Mapping(Mapping::Dict(entries)) => {
			let fields: Map<String, JsonValue> = entries.iter().map(|(key, item)| (key_text(key), value_to_json(item))).collect();
			JsonValue::Object(fields)
		}
	}
}

fn key_text(key: &Value) -> String {
	match key {
		Value::String(text) => text.clone(),
		other => value_to_json(other).to_string(),
	}
}

fn array_elements(array: &NdArray) -> Vec<JsonValue> {
	match array.dtype() {
		Dtype::Bool => array.bytes().iter().map(|byte| JsonValue::Bool(*byte != 0)).collect(),
		Dtype::I8 => elements::<i8>(array),
		Dtype::I16 => elements::<i16>(array),
		Dtype::I32 => elements::<i32>(array),
		Dtype::I64 => elements::<i64>(array),
		Dtype::U8 => elements::<u8>(array),
		Dtype::U16 => elements::<u16>(array),
		Dtype::U32 => elements::<u32>(array),
		Dtype::U64 => elements::<u64>(array),
		Dtype::F32 => elements::<f32>(array),
		Dtype::F16 | Dtype::F64 => array.to_f64_vec().into_iter().map(JsonValue::from).collect(),
	}
}

fn elements<T: Element + Into<JsonValue>>(array: &NdArray) -> Vec<JsonValue> {
	array.to_vec::<T>().unwrap_or_default().into_iter().map(Into::into).collect()
}

/// Fold row-major elements into nested arrays following `shape`.
fn nest(flat: &[JsonValue], shape: &[usize]) -> JsonValue {
	let Some((&outer, inner)) = shape.split_first() else {
		return flat.first().cloned().unwrap_or(JsonValue::Null);
	};
	let stride: usize = inner.iter().product();
	let rows = (0..outer)
		.map(|row| {
			let chunk = flat.get(row * stride..(row + 1) * stride).unwrap_or(&[]);
			nest(chunk, inner)
		})
		.collect();
	JsonValue::Array(rows)
}

#[cfg(test)]
mod tests {
	use nestpack::Value;
	use nestpack::codec::{Int, NdArray};
	use serde_json::json;

	use super::{value_from_json, value_to_json};

	#[test]
	fn json_numbers_split_into_int_and_float() {
		assert_eq!(value_from_json(&json!(3)), Value::from(3));
		assert_eq!(value_from_json(&json!(-3)), Value::from(-3));
		assert_eq!(value_from_json(&json!(2.5)), Value::from(2.5));
		assert_eq!(value_from_json(&json!(u64::MAX)), Value::from(u64::MAX as f64));
	}

	#[test]
	fn objects_become_string_keyed_dicts() {
		let value = value_from_json(&json!({"a": [1, "x"], "b": null}));
		let expected = Value::dict([
			(Value::from("a"), Value::list([Value::from(1), Value::from("x")])),
			(Value::from("b"), Value::Null),
		]);
		assert_eq!(value, expected);
		assert_eq!(value_to_json(&value), json!({"a": [1, "x"], "b": null}));
	}

	#[test]
	fn non_json_shapes_render_as_arrays() {
		let value = Value::dict([
			(Value::from(1), Value::tuple([Value::Int(Int::U64(u64::MAX))])),
			(Value::from(2), Value::set([Value::from("k")])),
		]);
		assert_eq!(value_to_json(&value), json!({"1": [u64::MAX], "2": ["k"]}));
	}

	#[test]
	fn arrays_render_as_nested_rows() {
		let array = NdArray::from_elements(vec![2, 3], &[1_i32, 2, 3, 4, 5, 6]).expect("fits");
		assert_eq!(value_to_json(&Value::Array(array)), json!([[1, 2, 3], [4, 5, 6]]));

		let empty = NdArray::from_elements(vec![2, 0], &[0.0_f32; 0]).expect("fits");
		assert_eq!(value_to_json(&Value::Array(empty)), json!([[], []]));
	}
}
