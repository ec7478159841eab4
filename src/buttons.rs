//! Hiding "move up" on the first row and "move down" on the last row.

use crate::{attributes, rows, Result};
use tracing::{instrument, trace};
use web_sys::Element;

/// Shows every `up` and `down` trigger of `collection`'s direct rows, then hides the first row's `up` and the last
/// row's `down` triggers by adding `hidden_class`.
///
/// Triggers inside nested collections are left alone.
///
/// # Errors
///
/// Iff a DOM call fails.
#[instrument(skip(collection))]
pub fn update_collection_buttons(collection: &Element, hidden_class: &str) -> Result<()> {
	let rows = rows::direct_rows(collection)?;
	trace!("Updating buttons of {} row(s).", rows.len());

	for (action, hidden_row) in [("up", rows.first()), ("down", rows.last())] {
		let selector = attributes::action_selector(action);
		for row in &rows {
			let hide = Some(row) == hidden_row;
			for button in own_buttons(row, &selector)? {
				if hide {
					button.class_list().add_1(hidden_class)?;
				} else {
					button.class_list().remove_1(hidden_class)?;
				}
			}
		}
	}
	Ok(())
}

/// Updates every collection at or below `root`.
///
/// # Errors
///
/// Iff a DOM call fails.
pub fn update_all(root: &Element, hidden_class: &str) -> Result<()> {
	if root.matches(attributes::COLLECTION)? {
		update_collection_buttons(root, hidden_class)?;
	}
	for collection in attributes::query_all(root, attributes::COLLECTION)? {
		update_collection_buttons(&collection, hidden_class)?;
	}
	Ok(())
}

/// Triggers matching `selector` whose closest row is `row` itself.
fn own_buttons(row: &Element, selector: &str) -> Result<Vec<Element>> {
	let mut own = Vec::new();
	for button in attributes::query_all(row, selector)? {
		if button.closest(attributes::NODE)?.as_ref() == Some(row) {
			own.push(button);
		}
	}
	Ok(own)
}
