use std::path::PathBuf;

use nestpack::codec::{ATTR_COLLECTION_TYPE, ATTR_DATA_TYPE, ATTR_HOMOGENEOUS, ROOT_NAME};
use nestpack::store::{Attr, Container, Node};

use crate::cmd::Result;
use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print header, compression, and node statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let container = Container::open(&path)?;
	let stats = container.stats();
	let root = RootSummary::of(container.root().child(ROOT_NAME));

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			compression: container.compression.as_str().to_owned(),
			header_size: container.header.header_size,
			format_version: container.header.format_version,
			group_count: stats.group_count,
			dataset_count: stats.dataset_count,
			max_depth: stats.max_depth,
			root: root.label(),
			homogeneous: root.homogeneous,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("compression: {}", container.compression.as_str());
	println!("header_size: {}", container.header.header_size);
	println!("format_version: {}", container.header.format_version);
	println!("groups: {}", stats.group_count);
	println!("datasets: {}", stats.dataset_count);
	println!("max_depth: {}", stats.max_depth);
	println!("root: {}", root.label());
	if let Some(flag) = root.homogeneous {
		println!("homogeneous: {flag}");
	}

	Ok(())
}

/// Type attributes of the top-level value node.
#[derive(Debug, Default, PartialEq)]
struct RootSummary {
	kind: Option<&'static str>,
	type_tag: Option<String>,
	homogeneous: Option<bool>,
}

impl RootSummary {
	fn of(node: Option<&Node>) -> Self {
		let Some(node) = node else {
			return Self::default();
		};
		let attrs = node.attrs();
		let type_tag = attrs
			.get(ATTR_COLLECTION_TYPE)
			.or_else(|| attrs.get(ATTR_DATA_TYPE))
			.and_then(Attr::as_text)
			.map(str::to_owned);
		Self {
			kind: Some(node.kind_label()),
			type_tag,
			homogeneous: attrs.get(ATTR_HOMOGENEOUS).and_then(Attr::as_bool),
		}
	}

	fn label(&self) -> String {
		match (self.kind, self.type_tag.as_deref()) {
			(Some(kind), Some(tag)) => format!("{tag} ({kind})"),
			(Some(kind), None) => format!("untyped ({kind})"),
			(None, _) => "-".to_owned(),
		}
	}
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	compression: String,
	header_size: usize,
	format_version: u16,
	group_count: usize,
	dataset_count: usize,
	max_depth: usize,
	root: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	homogeneous: Option<bool>,
}
