//! Reading and rewriting the position encoded in a row.
//!
//! A row's index lives in [`data-collection-index`](`attributes::INDEX`) and is mirrored into
//! - its `id`, which ends in `_<index>`,
//! - its [`data-full-name`](`attributes::FULL_NAME`), which ends in `[<index>]`,
//! - the text of its index labels, and
//! - the ids and names of its descendants, which are prefixed by the row's own id and full name.
//!
//! [`renumber`] keeps all of these in lock-step.

use crate::{attributes, Error, Result};
use core::convert::TryFrom;
use tracing::{instrument, trace, trace_span};
use web_sys::Element;

/// Parses a row's current index.
///
/// # Errors
///
/// [`Error::InvalidIndex`] iff the attribute is missing or not a non-negative decimal integer.
pub fn index_of(row: &Element) -> Result<u32> {
	let value = row.get_attribute(attributes::INDEX);
	match value.as_deref().map(str::trim).map(str::parse::<u32>) {
		Some(Ok(index)) => Ok(index),
		_ => Err(Error::InvalidIndex { value }),
	}
}

/// Shifts `index` by `delta`, refusing to leave the `u32` range.
///
/// # Errors
///
/// [`Error::IndexOutOfRange`] iff the result would be negative or too large.
pub fn shifted(index: u32, delta: i64) -> Result<u32> {
	i64::from(index)
		.checked_add(delta)
		.and_then(|shifted| u32::try_from(shifted).ok())
		.ok_or(Error::IndexOutOfRange { index, delta })
}

/// Moves `row` to `current index + delta` and rewrites everything derived from its index.
///
/// Returns the new index.
///
/// # Errors
///
/// Iff the current index can't be parsed, the new index would be out of range or a DOM call fails.
/// Nothing is modified in the first two cases.
#[instrument(skip(row))]
pub fn renumber(row: &Element, delta: i64) -> Result<u32> {
	let old_index = index_of(row)?;
	let new_index = shifted(old_index, delta)?;
	rewrite(row, old_index, new_index)?;
	Ok(new_index)
}

/// Rewrites a row already known to be at `old_index` to `new_index`.
pub(crate) fn rewrite(row: &Element, old_index: u32, new_index: u32) -> Result<()> {
	let span = trace_span!("Rewriting row index", old_index, new_index);
	let _enter = span.enter();

	let new_text = new_index.to_string();
	row.set_attribute(attributes::INDEX, &new_text)?;

	for label in attributes::query_all(row, attributes::NODE_INDEX)? {
		// Labels of nested rows follow their own row's index.
		if label.closest(attributes::NODE)?.as_ref() == Some(row) {
			label.set_text_content(Some(&new_text));
		}
	}

	let id = rewrite_attribute(row, "id", &format!("_{}", old_index), &format!("_{}", new_index))?;
	let full_name = rewrite_attribute(row, attributes::FULL_NAME, &format!("[{}]", old_index), &format!("[{}]", new_index))?;

	let replacements: Vec<(String, String)> = id.into_iter().chain(full_name).filter(|(old, new)| old != new && !old.is_empty()).collect();
	if !replacements.is_empty() {
		let inner_html = row.inner_html();
		let rewritten = replacements.iter().fold(inner_html.clone(), |html, (old, new)| html.replace(old.as_str(), new));
		if rewritten != inner_html {
			trace!("Rewriting inner markup.");
			row.set_inner_html(&rewritten);
		}
	}
	Ok(())
}

/// Returns the `(old, new)` attribute values iff the attribute is present.
fn rewrite_attribute(row: &Element, name: &str, search: &str, replace: &str) -> Result<Option<(String, String)>> {
	let old = match row.get_attribute(name) {
		Some(old) => old,
		None => return Ok(None),
	};
	let new = replace_last_occurrence(&old, search, replace);
	if new != old {
		if cfg!(feature = "dangerous-logging") {
			trace!("Rewriting {}: {:?} -> {:?}", name, old, new);
		}
		row.set_attribute(name, &new)?;
	}
	Ok(Some((old, new)))
}

/// Replaces only the last occurrence of `search` in `text`.
///
/// `text` is returned unchanged if `search` doesn't occur in it.
///
/// ```
/// use form_collection_dom::index::replace_last_occurrence;
///
/// assert_eq!(replace_last_occurrence("form_items_1_tags_1", "_1", "_2"), "form_items_1_tags_2");
/// assert_eq!(replace_last_occurrence("form[items][1]", "[3]", "[4]"), "form[items][1]");
/// ```
#[must_use]
pub fn replace_last_occurrence(text: &str, search: &str, replace: &str) -> String {
	match text.rfind(search) {
		Some(start) if !search.is_empty() => {
			let mut replaced = String::with_capacity(text.len() - search.len() + replace.len());
			replaced.push_str(&text[..start]);
			replaced.push_str(replace);
			replaced.push_str(&text[start + search.len()..]);
			replaced
		}
		_ => text.to_owned(),
	}
}
