use std::borrow::Cow;

/// Runtime configuration of a [`CollectionWidget`](`crate::CollectionWidget`).
///
/// ```
/// use form_collection_dom::Options;
///
/// let options = Options::new().hidden_class("hidden").scroll_into_view(false);
/// assert_eq!(options.get_hidden_class(), "hidden");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
	hidden_class: Cow<'static, str>,
	scroll_into_view: bool,
	propagate_values: bool,
	dom_events: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self::new()
	}
}

impl Options {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			hidden_class: Cow::Borrowed("d-none"),
			scroll_into_view: true,
			propagate_values: true,
			dom_events: true,
		}
	}

	/// CSS class that hides the first row's "up" and the last row's "down" triggers. Defaults to `d-none`.
	#[must_use]
	pub fn hidden_class(mut self, hidden_class: impl Into<Cow<'static, str>>) -> Self {
		self.hidden_class = hidden_class.into();
		self
	}

	/// Whether rows created by add, insert or duplicate are scrolled into view.
	#[must_use]
	pub fn scroll_into_view(mut self, scroll_into_view: bool) -> Self {
		self.scroll_into_view = scroll_into_view;
		self
	}

	/// Whether `change` events inside rows are mirrored into attributes, so that markup rewrites keep user input.
	#[must_use]
	pub fn propagate_values(mut self, propagate_values: bool) -> Self {
		self.propagate_values = propagate_values;
		self
	}

	/// Whether each phase is also dispatched as a DOM `CustomEvent` (`collection.node.<action>[.before|.after]`).
	#[must_use]
	pub fn dom_events(mut self, dom_events: bool) -> Self {
		self.dom_events = dom_events;
		self
	}

	#[must_use]
	pub fn get_hidden_class(&self) -> &str {
		&self.hidden_class
	}

	#[must_use]
	pub fn get_scroll_into_view(&self) -> bool {
		self.scroll_into_view
	}

	#[must_use]
	pub fn get_propagate_values(&self) -> bool {
		self.propagate_values
	}

	#[must_use]
	pub fn get_dom_events(&self) -> bool {
		self.dom_events
	}
}
