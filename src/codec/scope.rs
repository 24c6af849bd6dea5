use std::fmt;

/// Position of one node during encode/decode, linked to its parent.
///
/// Depth counts container nodes: the `root` node is depth 1.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
	parent: Option<&'a Scope<'a>>,
	name: &'a str,
	depth: u32,
}

impl<'a> Scope<'a> {
	/// Top-level scope for the node named `name`.
	pub fn root(name: &'a str) -> Self {
		Self { parent: None, name, depth: 1 }
	}

	/// Scope of a child node one level down.
	pub fn child<'b>(&'b self, name: &'b str) -> Scope<'b> {
		Scope {
			parent: Some(self),
			name,
			depth: self.depth + 1,
		}
	}

	/// Node name at this position.
	pub fn name(&self) -> &'a str {
		self.name
	}

	/// Nesting depth of this node.
	pub fn depth(&self) -> u32 {
		self.depth
	}

	/// Slash-separated path from the container root, e.g. `/root/c/0`.
	pub fn path(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Scope<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(parent) = self.parent {
			parent.fmt(f)?;
		}
		write!(f, "/{}", self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::Scope;

	#[test]
	fn path_joins_names_from_root() {
		let root = Scope::root("root");
		let entry = root.child("c");
		let item = entry.child("0");
		assert_eq!(root.path(), "/root");
		assert_eq!(item.path(), "/root/c/0");
		assert_eq!(item.name(), "0");
		assert_eq!(item.depth(), 3);
	}
}
