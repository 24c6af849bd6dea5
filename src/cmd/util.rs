use nestpack::store::{Attr, Attrs};

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to render json: {err}"),
	}
}

/// Render one attribute value for text listings.
pub(crate) fn attr_label(attr: &Attr) -> String {
	match attr {
		Attr::Text(text) => text.clone(),
		Attr::Bool(flag) => flag.to_string(),
	}
}

/// Render an attribute set as `key=value` pairs.
pub(crate) fn attrs_label(attrs: &Attrs) -> String {
	attrs.iter().map(|(key, attr)| format!("{key}={}", attr_label(attr))).collect::<Vec<_>>().join(" ")
}

/// Convert an attribute value to JSON.
pub(crate) fn attr_json(attr: &Attr) -> serde_json::Value {
	match attr {
		Attr::Text(text) => serde_json::json!(text),
		Attr::Bool(flag) => serde_json::json!(flag),
	}
}
