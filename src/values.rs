//! Mirroring live form control state into markup.
//!
//! Renumbering rewrites a row's inner markup and moving re-parents it, which resets every control to the state its
//! attributes describe. Copying the live state into those attributes on each `change` keeps the user's input.

use crate::{attributes, Result};
use tracing::{instrument, trace};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

/// Writes `control`'s current state into its attributes iff it's inside a row.
///
/// Returns whether anything was written.
///
/// # Errors
///
/// Iff a DOM call fails.
#[instrument(skip(control))]
pub fn propagate(control: &Element) -> Result<bool> {
	if control.closest(attributes::NODE)?.is_none() {
		return Ok(false);
	}

	if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
		match input.type_().as_str() {
			"radio" | "checkbox" => {
				trace!("Propagating checkedness.");
				if input.checked() {
					input.set_attribute("checked", "checked")?;
				} else {
					input.remove_attribute("checked")?;
				}
				// Other radio buttons in the group were unchecked implicitly.
				if input.type_() == "radio" && input.checked() {
					uncheck_radio_group(input)?;
				}
			}
			_ => {
				trace!("Propagating value.");
				input.set_attribute("value", &input.value())?;
			}
		}
		Ok(true)
	} else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
		trace!("Propagating selection.");
		for option in attributes::query_all(select, "option")? {
			let selected = option.unchecked_ref::<web_sys::HtmlOptionElement>().selected();
			if selected {
				option.set_attribute("selected", "selected")?;
			} else {
				option.remove_attribute("selected")?;
			}
		}
		Ok(true)
	} else if let Some(text_area) = control.dyn_ref::<HtmlTextAreaElement>() {
		trace!("Propagating text.");
		text_area.set_text_content(Some(&text_area.value()));
		Ok(true)
	} else {
		Ok(false)
	}
}

fn uncheck_radio_group(input: &HtmlInputElement) -> Result<()> {
	let name = input.name();
	if name.is_empty() {
		return Ok(());
	}
	let form_root = match input.closest("form")? {
		Some(form) => form,
		None => match input.owner_document().and_then(|document| document.document_element()) {
			Some(root) => root,
			None => return Ok(()),
		},
	};
	for other in attributes::query_all(&form_root, "input[type=radio][checked]")? {
		let other = other.unchecked_into::<HtmlInputElement>();
		if other.name() == name && &other != input {
			other.remove_attribute("checked")?;
		}
	}
	Ok(())
}
