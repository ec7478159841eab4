//! Stamping out new rows from prototype markup.
//!
//! The placeholder token is substituted textually across the whole prototype, so a token that also appears in
//! unrelated markup is replaced there too. Existing server-side templates rely on exactly this behaviour.

use crate::{attributes, index, Error, Result};
use tracing::{instrument, trace};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTemplateElement};

/// Where [`insert_markup`] places a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	/// As the collection's last child.
	Append,
	/// Before the row currently at this index, or in the collection's tail slot if there is none.
	///
	/// The tail slot is directly after the last row if that is the last child,
	/// otherwise before the last child (usually an "add" trigger).
	At(u32),
}

/// Replaces every occurrence of `token` in `prototype` with `index`.
///
/// # Errors
///
/// [`Error::Configuration`] iff `token` is empty.
///
/// ```
/// use form_collection_dom::template::instantiate;
///
/// let markup = instantiate(r#"<li id="list___name__" data-collection-index="__name__"></li>"#, "__name__", 3).unwrap();
/// assert_eq!(markup, r#"<li id="list_3" data-collection-index="3"></li>"#);
/// ```
pub fn instantiate(prototype: &str, token: &str, index: u32) -> Result<String> {
	if token.is_empty() {
		return Err(Error::Configuration("the prototype name (placeholder token) is empty".to_owned()));
	}
	Ok(prototype.replace(token, &index.to_string()))
}

/// Parses `markup` into a new row with `index` and places it in `collection`.
///
/// The markup is parsed and checked in a detached `<template>` first, so a bad prototype leaves `collection` untouched.
///
/// # Errors
///
/// [`Error::Template`] iff `markup` doesn't consist of exactly one row element with
/// `data-collection-index="<index>"`, otherwise iff a DOM call fails.
#[instrument(skip(collection, markup))]
pub fn insert_markup(collection: &Element, markup: &str, index: u32, placement: Placement) -> Result<Element> {
	if cfg!(feature = "dangerous-logging") {
		trace!("Inserting markup: {:?}", markup);
	}

	let row = parse_row(collection, markup, index)?;

	let reference = match placement {
		Placement::Append => None,
		Placement::At(position) => match collection.query_selector(&attributes::direct_node_with_index(position))? {
			Some(existing) if existing.matches(attributes::NODE)? => Some(existing),
			_ => tail_slot(collection)?,
		},
	};
	collection.insert_before(&row, reference.as_ref().map(|element| -> &web_sys::Node { element }))?;
	Ok(row)
}

fn parse_row(collection: &Element, markup: &str, index: u32) -> Result<Element> {
	let document = collection.owner_document().ok_or_else(|| Error::Dom("the collection has no owner document".to_owned()))?;
	let template = document
		.create_element("template")?
		.dyn_into::<HtmlTemplateElement>()
		.map_err(|element| Error::Dom(format!("`template` did not create an HTMLTemplateElement: {:?}", element)))?;
	template.set_inner_html(markup);

	let content = template.content();
	if content.child_element_count() != 1 {
		trace!("Prototype markup has {} root elements.", content.child_element_count());
		return Err(Error::Template { index });
	}
	match content.first_element_child() {
		Some(row) if row.matches(attributes::NODE)? && index::index_of(&row).ok() == Some(index) => Ok(row),
		_ => Err(Error::Template { index }),
	}
}

fn tail_slot(collection: &Element) -> Result<Option<Element>> {
	Ok(match collection.last_element_child() {
		None => None,
		Some(last) if last.matches(attributes::NODE)? => None,
		Some(last) => Some(last),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_occurrence_is_replaced() {
		assert_eq!(
			instantiate(r#"<div id="f___name__"><input name="f[__name__][title]"></div>"#, "__name__", 12).unwrap(),
			r#"<div id="f_12"><input name="f[12][title]"></div>"#,
		);
	}

	#[test]
	fn unrelated_occurrences_are_replaced_too() {
		assert_eq!(instantiate("<p>__name__ is __name__</p>", "__name__", 0).unwrap(), "<p>0 is 0</p>");
	}

	#[test]
	fn empty_token_is_rejected() {
		assert!(matches!(instantiate("<div></div>", "", 0), Err(Error::Configuration(_))));
	}

	#[test]
	fn missing_token_leaves_markup_unchanged() {
		assert_eq!(instantiate("<div></div>", "__name__", 4).unwrap(), "<div></div>");
	}
}
