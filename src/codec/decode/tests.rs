use super::{UnpackOptions, decode};
use crate::codec::encode::{PackOptions, encode};
use crate::codec::keys::IndexSetError;
use crate::codec::{DecodeError, F16, Float, Int, NdArray, Value};
use crate::store::{Buffer, DatasetOptions, Dtype, Group};

fn round_trip(value: &Value) -> Value {
	let mut file = Group::new();
	encode(value, &mut file, &PackOptions::default()).expect("encode");
	decode(&file, &UnpackOptions::default()).expect("decode")
}

fn decode_err(file: &Group) -> DecodeError {
	decode(file, &UnpackOptions::default()).expect_err("malformed input")
}

fn int_scalar(group: &mut Group, name: &str, value: i64) {
	let buffer = Buffer::Numeric {
		dtype: Dtype::I64,
		bytes: value.to_le_bytes().to_vec(),
	};
	let dataset = group.create_dataset(name, Vec::new(), buffer, DatasetOptions::default()).expect("dataset");
	dataset.set_attr("data_type", "int");
}

fn expanded_list(file: &mut Group) -> &mut Group {
	let root = file.create_group("root").expect("root");
	root.set_attr("collection_type", "list");
	root.set_attr("data_type", "list");
	root.set_attr("homogeneous", false);
	root
}

#[test]
fn mixed_container_round_trips() {
	let array = NdArray::from_elements(vec![2, 4], &[1_u16, 2, 3, 4, 5, 6, 7, 8]).expect("fits");
	let value = Value::dict([
		(Value::from("a"), Value::list([Value::from(1), Value::from(2), Value::from(3)])),
		(Value::from("b"), Value::tuple([Value::from(1), Value::from("x"), Value::Null])),
		(Value::from("c"), Value::dict([(Value::from(1), Value::Bool(true)), (Value::from(2), Value::Bool(false))])),
		(Value::from("d"), Value::set([Value::from("p"), Value::from("q")])),
		(Value::from("e"), Value::Array(array)),
		(Value::from("f"), Value::Float(Float::F16(F16::from_bits(0x3555)))),
	]);
	assert_eq!(round_trip(&value), value);
}

#[test]
fn key_types_survive() {
	let int_keys = Value::dict([(Value::from(1), Value::from("a")), (Value::from(2), Value::from("b"))]);
	let str_keys = Value::dict([(Value::from("1"), Value::from("a")), (Value::from("2"), Value::from("b"))]);
	assert_eq!(round_trip(&int_keys), int_keys);
	assert_eq!(round_trip(&str_keys), str_keys);
	assert_ne!(round_trip(&int_keys), str_keys);

	let mixed = Value::dict([
		(Value::Int(Int::I16(-4)), Value::list([])),
		(Value::from("k"), Value::set([Value::Int(Int::U64(u64::MAX))])),
	]);
	assert_eq!(round_trip(&mixed), mixed);
}

#[test]
fn empty_collections_keep_their_kind() {
	for value in [Value::list([]), Value::tuple([]), Value::dict([]), Value::set([])] {
		assert_eq!(round_trip(&value), value);
	}
}

#[test]
fn gap_in_indices_is_invalid() {
	let mut file = Group::new();
	let root = expanded_list(&mut file);
	int_scalar(root, "0", 1);
	int_scalar(root, "2", 3);

	match decode_err(&file) {
		DecodeError::InvalidIndex { path, reason } => {
			assert_eq!(path, "/root");
			assert_eq!(reason, IndexSetError::Gap { missing: 1 });
		}
		other => panic!("unexpected error {other:?}"),
	}
}

#[test]
fn unknown_tag_is_reported() {
	let mut file = Group::new();
	let root = expanded_list(&mut file);
	int_scalar(root, "0", 1);
	let odd = root
		.create_dataset("1", Vec::new(), Buffer::Empty, DatasetOptions::default())
		.expect("dataset");
	odd.set_attr("data_type", "complex128");

	assert!(matches!(
		decode_err(&file),
		DecodeError::UnknownTypeTag { path, tag } if path == "/root/1" && tag == "complex128"
	));
}

#[test]
fn missing_pieces_are_malformed() {
	let file = Group::new();
	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { .. }));

	let mut file = Group::new();
	file.create_dataset("root", Vec::new(), Buffer::Empty, DatasetOptions::default())
		.expect("dataset");
	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { reason, .. } if reason.contains("data_type")));

	let mut file = Group::new();
	let root = file.create_group("root").expect("root");
	root.set_attr("collection_type", "dict");
	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { reason, .. } if reason.contains("homogeneous")));
}

#[test]
fn tag_and_dtype_must_agree() {
	let mut file = Group::new();
	let root = file
		.create_dataset(
			"root",
			Vec::new(),
			Buffer::Numeric {
				dtype: Dtype::I64,
				bytes: 1_i64.to_le_bytes().to_vec(),
			},
			DatasetOptions::default(),
		)
		.expect("dataset");
	root.set_attr("data_type", "bool");
	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { .. }));

	let mut file = Group::new();
	let root = file
		.create_dataset("root", Vec::new(), Buffer::Numeric { dtype: Dtype::Bool, bytes: vec![1] }, DatasetOptions::default())
		.expect("dataset");
	root.set_attr("data_type", "uint8");
	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { .. }));
}

#[test]
fn entry_name_must_parse_as_declared_key() {
	let mut file = Group::new();
	let root = file.create_group("root").expect("root");
	root.set_attr("collection_type", "dict");
	root.set_attr("data_type", "dict");
	root.set_attr("homogeneous", false);
	let entry = root.create_group("abc").expect("entry");
	entry.set_attr("data_type", "int");
	int_scalar(entry, "val", 1);

	assert!(matches!(decode_err(&file), DecodeError::MalformedContainer { path, .. } if path == "/root/abc"));
}

#[test]
fn depth_limit_applies_on_decode() {
	let mut value = Value::from(0);
	for _ in 0..4 {
		value = Value::list([value, Value::from("pad")]);
	}
	let mut file = Group::new();
	encode(&value, &mut file, &PackOptions::default()).expect("encode");

	let shallow = UnpackOptions { max_depth: 3 };
	assert!(matches!(decode(&file, &shallow), Err(DecodeError::DepthExceeded { max_depth: 3, .. })));
	assert_eq!(decode(&file, &UnpackOptions::default()).expect("decode"), value);
}

fn mapping_root<'g>(file: &'g mut Group, collection: &str, homogeneous: bool) -> &'g mut Group {
	let root = file.create_group("root").expect("root");
	root.set_attr("collection_type", collection);
	root.set_attr("data_type", collection);
	root.set_attr("homogeneous", homogeneous);
	root
}

#[test]
fn non_canonical_int_entry_names_are_malformed() {
	let mut file = Group::new();
	let root = mapping_root(&mut file, "dict", false);
	for (name, value) in [("1", 10), ("01", 20)] {
		let entry = root.create_group(name).expect("entry");
		entry.set_attr("data_type", "int");
		int_scalar(entry, "val", value);
	}

	assert!(matches!(
		decode_err(&file),
		DecodeError::MalformedContainer { path, .. } if path == "/root/01"
	));
}

#[test]
fn repeated_flat_keys_are_malformed() {
	let repeated = || Buffer::Strings(vec![b"a".to_vec(), b"a".to_vec()]);

	let mut file = Group::new();
	let root = mapping_root(&mut file, "set", true);
	let keys = root
		.create_dataset("keys", vec![2], repeated(), DatasetOptions::default())
		.expect("keys");
	keys.set_attr("data_type", "string");
	assert!(matches!(
		decode_err(&file),
		DecodeError::MalformedContainer { path, reason } if path == "/root" && reason.contains("duplicate key")
	));

	let mut file = Group::new();
	let root = mapping_root(&mut file, "dict", true);
	let keys = root
		.create_dataset("keys", vec![2], repeated(), DatasetOptions::default())
		.expect("keys");
	keys.set_attr("data_type", "string");
	let vals = root
		.create_dataset(
			"vals",
			vec![2],
			Buffer::Numeric {
				dtype: Dtype::I64,
				bytes: [1_i64, 2].iter().flat_map(|item| item.to_le_bytes()).collect(),
			},
			DatasetOptions::default(),
		)
		.expect("vals");
	vals.set_attr("data_type", "int");
	assert!(matches!(
		decode_err(&file),
		DecodeError::MalformedContainer { reason, .. } if reason.contains("duplicate key")
	));
}
