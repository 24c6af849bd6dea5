use std::collections::BTreeMap;
use std::path::PathBuf;

use nestpack::store::{Container, Group, Node};

use crate::cmd::Result;
use crate::cmd::util::{attr_json, attrs_label, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// List every node in a container with its attributes.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let container = Container::open(&path)?;
	let mut rows = Vec::new();
	collect_rows(container.root(), "", 0, &mut rows);

	if json {
		let payload = TreeJson {
			path: path.display().to_string(),
			nodes: rows.iter().map(NodeRow::to_json).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	for row in &rows {
		println!("{}", row.render());
	}
	Ok(())
}

struct NodeRow<'a> {
	path: String,
	depth: usize,
	node: &'a Node,
}

impl NodeRow<'_> {
	fn render(&self) -> String {
		let indent = "  ".repeat(self.depth);
		let name = self.path.rsplit('/').next().unwrap_or_default();
		let mut line = format!("{indent}{name} [{}]", self.node.kind_label());
		if let Node::Dataset(dataset) = self.node {
			line.push_str(&format!(" {} {:?}", dataset.buffer().type_label(), dataset.shape()));
			if let Some(level) = dataset.options().compression {
				line.push_str(&format!(" zstd:{level}"));
			}
		}
		let attrs = attrs_label(self.node.attrs());
		if !attrs.is_empty() {
			line.push(' ');
			line.push_str(&attrs);
		}
		line
	}

	fn to_json(&self) -> NodeJson {
		let (shape, dtype, compression) = match self.node {
			Node::Dataset(dataset) => (
				Some(dataset.shape().to_vec()),
				Some(dataset.buffer().type_label()),
				dataset.options().compression,
			),
			Node::Group(_) => (None, None, None),
		};
		NodeJson {
			path: self.path.clone(),
			kind: self.node.kind_label(),
			attrs: self.node.attrs().iter().map(|(key, attr)| (key.to_owned(), attr_json(attr))).collect(),
			shape,
			dtype,
			compression,
		}
	}
}

fn collect_rows<'a>(group: &'a Group, prefix: &str, depth: usize, rows: &mut Vec<NodeRow<'a>>) {
	for (name, node) in group.children() {
		let path = format!("{prefix}/{name}");
		rows.push(NodeRow {
			path: path.clone(),
			depth,
			node,
		});
		if let Node::Group(child) = node {
			collect_rows(child, &path, depth + 1, rows);
		}
	}
}

#[derive(serde::Serialize)]
struct TreeJson {
	path: String,
	nodes: Vec<NodeJson>,
}

#[derive(serde::Serialize)]
struct NodeJson {
	path: String,
	kind: &'static str,
	attrs: BTreeMap<String, serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	shape: Option<Vec<usize>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	dtype: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	compression: Option<i32>,
}

#[cfg(test)]
mod tests {
	use nestpack::codec::{PackOptions, encode};
	use nestpack::store::Group;
	use nestpack::Value;

	use super::{NodeRow, collect_rows};

	#[test]
	fn rows_follow_name_order_with_full_paths() {
		let value = Value::tuple([Value::from(1), Value::from("a")]);
		let mut file = Group::new();
		encode(&value, &mut file, &PackOptions::uncompressed()).expect("encode");

		let mut rows: Vec<NodeRow<'_>> = Vec::new();
		collect_rows(&file, "", 0, &mut rows);
		let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
		assert_eq!(paths, ["/root", "/root/0", "/root/1"]);

		assert_eq!(rows[0].render(), "root [group] collection_type=tuple data_type=tuple homogeneous=false");
		assert_eq!(rows[2].render(), "  1 [dataset] bytes [] data_type=string");

		let json = serde_json::to_value(rows[1].to_json()).expect("serialize");
		assert_eq!(json["kind"], "dataset");
		assert_eq!(json["dtype"], "i64");
		assert_eq!(json["attrs"]["data_type"], "int");
	}
}
