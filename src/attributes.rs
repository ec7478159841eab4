//! The attribute contract between server-rendered markup and this crate.

/// Marker attribute distinguishing collections, rows and index labels.
pub const ROLE: &str = "data-collection";
/// [`ROLE`] value of a collection root.
pub const ROLE_COLLECTION: &str = "collection";
/// [`ROLE`] value of a row.
pub const ROLE_NODE: &str = "node";
/// [`ROLE`] value of an element whose text mirrors its row's index.
pub const ROLE_NODE_INDEX: &str = "node-index";

pub const COLLECTION: &str = "[data-collection=collection]";
pub const NODE: &str = "[data-collection=node]";
pub const NODE_INDEX: &str = "[data-collection=node-index]";

/// A row's current position.
pub const INDEX: &str = "data-collection-index";
/// Serialized form field path of a row, ending in `[<index>]`.
pub const FULL_NAME: &str = "data-full-name";

/// One of `add`, `insert`, `delete`, `up`, `down` or `duplicate`.
pub const ACTION: &str = "data-collection-action";
pub const ACTION_SELECTOR: &str = "[data-collection-action]";

/// Prototype markup, on a trigger or collection. Checked after [`PROTOTYPE_SHORT`].
pub const PROTOTYPE: &str = "data-collection-prototype";
pub const PROTOTYPE_SHORT: &str = "data-prototype";
/// Placeholder token inside the prototype. Checked after [`PROTOTYPE_NAME_SHORT`].
pub const PROTOTYPE_NAME: &str = "data-collection-prototype-name";
pub const PROTOTYPE_NAME_SHORT: &str = "data-prototype-name";

/// Trigger override: id of the collection to act on.
pub const TARGET: &str = "data-collection-target";
/// Trigger override: id of the row to act on.
pub const TARGET_NODE: &str = "data-collection-node";
/// Trigger override: index to insert at.
pub const INSERT_POSITION: &str = "data-collection-insert-position";

/// Selector for the direct rows of the element it's run on.
pub const DIRECT_NODES: &str = ":scope > [data-collection=node]";

#[must_use]
pub fn direct_node_with_index(index: u32) -> String {
	format!(":scope > [data-collection-index=\"{}\"]", index)
}

#[must_use]
pub fn action_selector(action: &str) -> String {
	format!("[data-collection-action={}]", action)
}

/// Collects the elements matching `selector` below `element`, in document order.
pub(crate) fn query_all(element: &web_sys::Element, selector: &str) -> crate::Result<Vec<web_sys::Element>> {
	use wasm_bindgen::JsCast;

	let list = element.query_selector_all(selector)?;
	Ok((0..list.length())
		.filter_map(|i| list.get(i))
		.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
		.collect())
}
