//! The mutable context passed through a collection action's listeners.
//!
//! Each value an action needs (collection, row, position, prototype and its placeholder token) is resolved lazily on
//! first read through an ordered list of resolvers and then cached for the lifetime of the event.
//! A value set by a listener takes precedence over every resolver, so listeners can redirect an action before the
//! default mutation reads it.

use crate::{attributes, index, Error, Result};
use core::{fmt, str::FromStr};
use tracing::{trace, warn};
use web_sys::Element;

/// The structural mutations a trigger can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	Add,
	Insert,
	Delete,
	Up,
	Down,
	Duplicate,
}

impl Action {
	pub const ALL: [Action; 6] = [Action::Add, Action::Insert, Action::Delete, Action::Up, Action::Down, Action::Duplicate];

	/// The token used in [`data-collection-action`](`attributes::ACTION`).
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Action::Add => "add",
			Action::Insert => "insert",
			Action::Delete => "delete",
			Action::Up => "up",
			Action::Down => "down",
			Action::Duplicate => "duplicate",
		}
	}

	/// Name of the DOM event raised for `phase`, for example `collection.node.add.before`.
	#[must_use]
	pub fn event_name(self, phase: Phase) -> String {
		match phase {
			Phase::Action => format!("collection.node.{}", self.as_str()),
			Phase::Before => format!("collection.node.{}.before", self.as_str()),
			Phase::After => format!("collection.node.{}.after", self.as_str()),
		}
	}

	/// Whether the action creates a row.
	#[must_use]
	pub fn creates_row(self) -> bool {
		matches!(self, Action::Add | Action::Insert | Action::Duplicate)
	}
}

impl FromStr for Action {
	type Err = Error;

	fn from_str(token: &str) -> Result<Self> {
		Action::ALL.iter().copied().find(|action| action.as_str() == token).ok_or_else(|| Error::InvalidAction(token.to_owned()))
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Raised on the trigger as soon as the action is recognized. Cancelable.
	Action,
	/// Raised on the trigger right before the mutation. Cancelable, and the last chance to override values.
	Before,
	/// Raised on the collection after the mutation.
	After,
}

impl Phase {
	#[must_use]
	pub fn is_cancelable(self) -> bool {
		!matches!(self, Phase::After)
	}
}

type Resolver<T> = fn(&mut CollectionEvent) -> Result<Option<T>>;

const COLLECTION_RESOLVERS: &[Resolver<Element>] = &[collection_by_target_id, collection_is_trigger, collection_by_ancestor];
const NODE_RESOLVERS: &[Resolver<Element>] = &[node_by_target_id, node_by_ancestor];
const POSITION_RESOLVERS: &[Resolver<u32>] = &[position_on_trigger, position_of_node];
const PROTOTYPE_NAME_RESOLVERS: &[Resolver<String>] = &[
	|event| Ok(event.trigger_attribute(attributes::PROTOTYPE_NAME_SHORT)),
	|event| Ok(event.trigger_attribute(attributes::PROTOTYPE_NAME)),
	|event| Ok(event.collection()?.get_attribute(attributes::PROTOTYPE_NAME_SHORT)),
	|event| Ok(event.collection()?.get_attribute(attributes::PROTOTYPE_NAME)),
];
const PROTOTYPE_RESOLVERS: &[Resolver<String>] = &[
	|event| Ok(event.trigger_attribute(attributes::PROTOTYPE_SHORT)),
	|event| Ok(event.trigger_attribute(attributes::PROTOTYPE)),
	|event| Ok(event.collection()?.get_attribute(attributes::PROTOTYPE_SHORT)),
	|event| Ok(event.collection()?.get_attribute(attributes::PROTOTYPE)),
];

/// One phase of a collection action.
///
/// Accessors resolve and cache their value on first read. Setters replace the cached value.
#[derive(Debug, Clone)]
pub struct CollectionEvent {
	action: Action,
	phase: Phase,
	target: Option<Element>,
	origin: Option<web_sys::Event>,
	canceled: bool,
	collection: Option<Element>,
	node: Option<Option<Element>>,
	position: Option<Option<u32>>,
	prototype_name: Option<String>,
	prototype: Option<String>,
}

impl CollectionEvent {
	/// Creates an [`Action`](`Phase::Action`)-phase event without DOM context.
	///
	/// At least the collection must be [set](`CollectionEvent::set_collection`) before it can be dispatched.
	#[must_use]
	pub fn new(action: Action) -> Self {
		Self {
			action,
			phase: Phase::Action,
			target: None,
			origin: None,
			canceled: false,
			collection: None,
			node: None,
			position: None,
			prototype_name: None,
			prototype: None,
		}
	}

	/// Creates an [`Action`](`Phase::Action`)-phase event for a trigger element, optionally with the DOM event that
	/// activated it.
	#[must_use]
	pub fn from_trigger(action: Action, trigger: Element, origin: Option<web_sys::Event>) -> Self {
		Self {
			target: Some(trigger),
			origin,
			..Self::new(action)
		}
	}

	/// Creates the next phase's event, carrying over every value resolved so far.
	///
	/// Unresolved values stay unresolved and are looked up lazily in the new event too.
	#[must_use]
	pub fn derive(&self, phase: Phase) -> Self {
		Self {
			phase,
			canceled: false,
			..self.clone()
		}
	}

	#[must_use]
	pub fn action(&self) -> Action {
		self.action
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// The trigger element, if any.
	#[must_use]
	pub fn target(&self) -> Option<&Element> {
		self.target.as_ref()
	}

	/// The DOM event (usually a click) that started the action.
	#[must_use]
	pub fn origin_event(&self) -> Option<&web_sys::Event> {
		self.origin.as_ref()
	}

	/// Suppresses the default mutation. Has no effect in the [`After`](`Phase::After`) phase.
	pub fn cancel(&mut self) {
		if self.phase.is_cancelable() {
			self.canceled = true;
		} else {
			warn!("Tried to cancel collection.node.{} after it completed.", self.action);
		}
	}

	#[must_use]
	pub fn is_canceled(&self) -> bool {
		self.canceled
	}

	/// The collection to act on.
	///
	/// Resolved from the trigger's [`data-collection-target`](`attributes::TARGET`), the trigger itself if it is a
	/// collection, or its closest ancestor collection, in that order.
	///
	/// # Errors
	///
	/// [`Error::Resolution`] iff none of these yield a collection.
	pub fn collection(&mut self) -> Result<Element> {
		if let Some(collection) = &self.collection {
			return Ok(collection.clone());
		}
		let collection = self.resolve(COLLECTION_RESOLVERS)?.ok_or_else(|| {
			Error::Resolution(if self.target.is_some() {
				"collection not found".to_owned()
			} else {
				"this event does not have a target, and collection is not set".to_owned()
			})
		})?;
		self.collection = Some(collection.clone());
		Ok(collection)
	}

	/// The collection if it was already resolved or set, without resolving it.
	#[must_use]
	pub fn resolved_collection(&self) -> Option<&Element> {
		self.collection.as_ref()
	}

	pub fn set_collection(&mut self, collection: Element) -> &mut Self {
		self.collection = Some(collection);
		self
	}

	/// The row to act on, if any.
	///
	/// Resolved from the trigger's [`data-collection-node`](`attributes::TARGET_NODE`) or its closest ancestor row.
	///
	/// # Errors
	///
	/// [`Error::Resolution`] iff [`data-collection-node`](`attributes::TARGET_NODE`) names a missing element.
	pub fn node(&mut self) -> Result<Option<Element>> {
		if let Some(node) = &self.node {
			return Ok(node.clone());
		}
		let node = self.resolve(NODE_RESOLVERS)?;
		self.node = Some(node.clone());
		Ok(node)
	}

	/// The row if it was already resolved or set, without resolving it.
	#[must_use]
	pub fn resolved_node(&self) -> Option<&Element> {
		self.node.as_ref().and_then(Option::as_ref)
	}

	/// Sets the row, or explicitly no row.
	pub fn set_node(&mut self, node: Option<Element>) -> &mut Self {
		self.node = Some(node);
		self
	}

	/// The index an `insert` targets, if any.
	///
	/// Resolved from the trigger's [`data-collection-insert-position`](`attributes::INSERT_POSITION`) or the
	/// [`node`](`CollectionEvent::node`)'s index.
	///
	/// # Errors
	///
	/// Iff either of these is malformed or the row can't be resolved.
	pub fn position(&mut self) -> Result<Option<u32>> {
		if let Some(position) = self.position {
			return Ok(position);
		}
		let position = self.resolve(POSITION_RESOLVERS)?;
		self.position = Some(position);
		Ok(position)
	}

	pub fn set_position(&mut self, position: Option<u32>) -> &mut Self {
		self.position = Some(position);
		self
	}

	/// The placeholder token substituted by the new row's index.
	///
	/// Resolved from `data-prototype-name` or `data-collection-prototype-name`, on the trigger first and then on the
	/// collection.
	///
	/// # Errors
	///
	/// [`Error::Configuration`] iff none of these attributes is present.
	pub fn prototype_name(&mut self) -> Result<String> {
		if let Some(prototype_name) = &self.prototype_name {
			return Ok(prototype_name.clone());
		}
		let prototype_name = self.resolve(PROTOTYPE_NAME_RESOLVERS)?.ok_or_else(|| {
			Error::Configuration("this target does not contain a data-collection-prototype-name or data-prototype-name attribute, neither was it set".to_owned())
		})?;
		self.prototype_name = Some(prototype_name.clone());
		Ok(prototype_name)
	}

	pub fn set_prototype_name(&mut self, prototype_name: impl Into<String>) -> &mut Self {
		self.prototype_name = Some(prototype_name.into());
		self
	}

	/// The prototype markup new rows are stamped from.
	///
	/// Resolved from `data-prototype` or `data-collection-prototype`, on the trigger first and then on the collection.
	///
	/// # Errors
	///
	/// [`Error::Configuration`] iff none of these attributes is present.
	pub fn prototype(&mut self) -> Result<String> {
		if let Some(prototype) = &self.prototype {
			return Ok(prototype.clone());
		}
		let prototype = self.resolve(PROTOTYPE_RESOLVERS)?.ok_or_else(|| {
			Error::Configuration("this target does not contain a data-collection-prototype or data-prototype attribute, neither was it set".to_owned())
		})?;
		self.prototype = Some(prototype.clone());
		Ok(prototype)
	}

	pub fn set_prototype(&mut self, prototype: impl Into<String>) -> &mut Self {
		self.prototype = Some(prototype.into());
		self
	}

	fn resolve<T>(&mut self, resolvers: &[Resolver<T>]) -> Result<Option<T>> {
		for resolver in resolvers {
			if let Some(value) = resolver(self)? {
				return Ok(Some(value));
			}
		}
		Ok(None)
	}

	fn trigger_attribute(&self, name: &str) -> Option<String> {
		self.target.as_ref().and_then(|target| target.get_attribute(name))
	}

	/// Looks up the element named by the trigger's `attribute`, if the trigger has that attribute.
	fn trigger_reference(&self, attribute: &str) -> Result<Option<Element>> {
		let (target, id) = match (&self.target, self.trigger_attribute(attribute)) {
			(Some(target), Some(id)) => (target, id),
			_ => return Ok(None),
		};
		trace!("Following {}.", attribute);
		let document = target.owner_document().ok_or_else(|| Error::Dom("the trigger has no owner document".to_owned()))?;
		match document.get_element_by_id(&id) {
			Some(element) => Ok(Some(element)),
			None => Err(Error::Resolution(format!("{}={:?} does not name an element", attribute, id))),
		}
	}
}

fn collection_by_target_id(event: &mut CollectionEvent) -> Result<Option<Element>> {
	event.trigger_reference(attributes::TARGET)
}

fn collection_is_trigger(event: &mut CollectionEvent) -> Result<Option<Element>> {
	Ok(event.target.as_ref().filter(|target| target.get_attribute(attributes::ROLE).as_deref() == Some(attributes::ROLE_COLLECTION)).cloned())
}

fn collection_by_ancestor(event: &mut CollectionEvent) -> Result<Option<Element>> {
	match &event.target {
		Some(target) => Ok(target.closest(attributes::COLLECTION)?),
		None => Ok(None),
	}
}

fn node_by_target_id(event: &mut CollectionEvent) -> Result<Option<Element>> {
	event.trigger_reference(attributes::TARGET_NODE)
}

fn node_by_ancestor(event: &mut CollectionEvent) -> Result<Option<Element>> {
	match &event.target {
		Some(target) => Ok(target.closest(attributes::NODE)?),
		None => Ok(None),
	}
}

fn position_on_trigger(event: &mut CollectionEvent) -> Result<Option<u32>> {
	match event.trigger_attribute(attributes::INSERT_POSITION) {
		Some(value) => match value.trim().parse() {
			Ok(position) => Ok(Some(position)),
			Err(_) => Err(Error::InvalidIndex { value: Some(value) }),
		},
		None => Ok(None),
	}
}

fn position_of_node(event: &mut CollectionEvent) -> Result<Option<u32>> {
	match event.node()? {
		Some(node) if node.has_attribute(attributes::INDEX) => Ok(Some(index::index_of(&node)?)),
		_ => Ok(None),
	}
}
