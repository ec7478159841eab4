//! The structural mutations of a collection.
//!
//! Every operation reads and validates the indices of all direct rows before touching the DOM,
//! so that a malformed row aborts the operation instead of leaving the collection half renumbered.
//! Rows of nested collections are never renumbered here.

use crate::{
	attributes,
	index::{self, shifted},
	template::{self, Placement},
	Error, Result,
};
use tracing::{debug, instrument};
use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

/// The direct rows of `collection`, in DOM order.
///
/// # Errors
///
/// Iff the query fails.
pub fn direct_rows(collection: &Element) -> Result<Vec<Element>> {
	attributes::query_all(collection, attributes::DIRECT_NODES)
}

/// The direct rows of `collection` with their parsed indices, in DOM order.
///
/// # Errors
///
/// [`Error::InvalidIndex`] iff any row's index is malformed.
pub fn indexed_rows(collection: &Element) -> Result<Vec<(Element, u32)>> {
	direct_rows(collection)?
		.into_iter()
		.map(|row| -> Result<(Element, u32)> {
			let index = index::index_of(&row)?;
			Ok((row, index))
		})
		.collect()
}

/// The highest index among the direct rows, or [`None`] if there are none.
///
/// # Errors
///
/// [`Error::InvalidIndex`] iff any row's index is malformed.
pub fn last_index(collection: &Element) -> Result<Option<u32>> {
	Ok(indexed_rows(collection)?.into_iter().map(|(_, index)| index).max())
}

/// Appends a new row at the next free index.
///
/// # Errors
///
/// Iff the collection is malformed, the prototype doesn't produce a row or a DOM call fails.
#[instrument(skip(collection, prototype))]
pub fn add(collection: &Element, prototype_name: &str, prototype: &str) -> Result<Element> {
	let index = match last_index(collection)? {
		Some(last) => shifted(last, 1)?,
		None => 0,
	};
	debug!("Adding row {}.", index);
	let markup = template::instantiate(prototype, prototype_name, index)?;
	template::insert_markup(collection, &markup, index, Placement::Append)
}

/// Inserts a new row at `position` and shifts every row after it up by one.
///
/// # Errors
///
/// [`Error::PositionOutOfRange`] iff `position` is greater than the number of rows,
/// otherwise as [`add`].
#[instrument(skip(collection, prototype))]
pub fn insert(collection: &Element, prototype_name: &str, prototype: &str, position: u32) -> Result<Element> {
	let rows = indexed_rows(collection)?;
	if position as usize > rows.len() {
		return Err(Error::PositionOutOfRange { position, len: rows.len() });
	}
	for (_, index) in &rows {
		shifted(*index, 1)?;
	}

	let markup = template::instantiate(prototype, prototype_name, position)?;
	let new_row = template::insert_markup(collection, &markup, position, Placement::At(position))?;

	let rows = indexed_rows(collection)?;
	let at = position_of(&rows, &new_row)?;
	shift_all(&rows[at + 1..], 1)?;
	Ok(new_row)
}

/// Removes `row` and shifts every row after it down by one.
///
/// # Errors
///
/// [`Error::Resolution`] iff `row` isn't a direct row of `collection`,
/// otherwise iff the collection is malformed or a DOM call fails.
#[instrument(skip(collection, row))]
pub fn delete(collection: &Element, row: &Element) -> Result<()> {
	let rows = indexed_rows(collection)?;
	let at = position_of(&rows, row)?;
	debug!("Deleting row {}.", rows[at].1);
	shift_all(&rows[at + 1..], -1)?;
	row.remove();
	Ok(())
}

/// Swaps `row` with the row before it.
///
/// Returns `false` without changes iff `row` is already first.
///
/// # Errors
///
/// As [`delete`].
#[instrument(skip(collection, row))]
pub fn move_up(collection: &Element, row: &Element) -> Result<bool> {
	let rows = indexed_rows(collection)?;
	let at = position_of(&rows, row)?;
	if at == 0 {
		debug!("Row is already first.");
		return Ok(false);
	}
	swap(&rows[at - 1], &rows[at])?;
	Ok(true)
}

/// Swaps `row` with the row after it.
///
/// Returns `false` without changes iff `row` is already last.
///
/// # Errors
///
/// As [`delete`].
#[instrument(skip(collection, row))]
pub fn move_down(collection: &Element, row: &Element) -> Result<bool> {
	let rows = indexed_rows(collection)?;
	let at = position_of(&rows, row)?;
	if at + 1 == rows.len() {
		debug!("Row is already last.");
		return Ok(false);
	}
	swap(&rows[at], &rows[at + 1])?;
	Ok(true)
}

/// Inserts a deep copy of `row` directly after it and shifts the copy and every row after it up by one.
///
/// # Errors
///
/// As [`delete`].
#[instrument(skip(collection, row))]
pub fn duplicate(collection: &Element, row: &Element) -> Result<Element> {
	let rows = indexed_rows(collection)?;
	let at = position_of(&rows, row)?;
	let index = rows[at].1;
	let copy_index = shifted(index, 1)?;
	for (_, index) in &rows[at + 1..] {
		shifted(*index, 1)?;
	}
	debug!("Duplicating row {}.", index);

	let copy = row
		.clone_node_with_deep(true)?
		.dyn_into::<Element>()
		.map_err(|node| Error::Dom(format!("cloning a row produced a non-element: {:?}", node)))?;
	collection.insert_before(&copy, row.next_sibling().as_ref())?;

	index::rewrite(&copy, index, copy_index)?;
	shift_all(&rows[at + 1..], 1)?;
	Ok(copy)
}

fn position_of(rows: &[(Element, u32)], row: &Element) -> Result<usize> {
	rows.iter()
		.position(|(candidate, _)| candidate == row)
		.ok_or_else(|| Error::Resolution("the row is not a direct row of the collection".to_owned()))
}

/// Moves `later` before `earlier` in the DOM and exchanges their indices.
fn swap((earlier, earlier_index): &(Element, u32), (later, later_index): &(Element, u32)) -> Result<()> {
	let later_target = shifted(*later_index, -1)?;
	let earlier_target = shifted(*earlier_index, 1)?;

	let parent = earlier.parent_node().ok_or_else(|| Error::Dom("the row has no parent".to_owned()))?;
	let earlier_node: &Node = earlier;
	parent.insert_before(later, Some(earlier_node))?;

	index::rewrite(later, *later_index, later_target)?;
	index::rewrite(earlier, *earlier_index, earlier_target)
}

/// Shifts each row by `delta`, after checking that every new index is in range.
fn shift_all(rows: &[(Element, u32)], delta: i64) -> Result<()> {
	let targets = rows
		.iter()
		.map(|(row, index)| -> Result<(&Element, u32, u32)> { Ok((row, *index, shifted(*index, delta)?)) })
		.collect::<Result<Vec<_>>>()?;
	for (row, old_index, new_index) in targets {
		index::rewrite(row, old_index, new_index)?;
	}
	Ok(())
}
