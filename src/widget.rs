use crate::{
	attributes, buttons,
	event::{Action, CollectionEvent, Phase},
	index::shifted,
	rows, values, Error, Options, Result,
};
use core::{
	cell::{Cell, RefCell},
	fmt,
};
use hashbrown::HashMap;
use js_sys::{Object, Reflect};
use std::rc::Rc;
use tracing::{debug, debug_span, error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Element, Node, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

type Listener = dyn Fn(&mut CollectionEvent) -> Result<()>;

/// Handle to remove a listener with [`CollectionWidget::remove_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// How a dispatched action ended.
#[derive(Debug)]
pub enum Outcome {
	/// A listener canceled the action in the given phase. Nothing was changed.
	Canceled(Phase),
	/// The mutation ran. Contains the [`After`](`Phase::After`) event.
	Completed(CollectionEvent),
}

impl Outcome {
	/// The row created, moved or deleted by a completed action.
	#[must_use]
	pub fn node(&self) -> Option<&Element> {
		match self {
			Outcome::Canceled(_) => None,
			Outcome::Completed(after) => after.resolved_node(),
		}
	}
}

struct Registration {
	id: ListenerId,
	action: Option<Action>,
	listener: Rc<Listener>,
}

struct Shared {
	options: Options,
	listeners: RefCell<HashMap<Phase, Vec<Registration>>>,
	next_listener_id: Cell<u64>,
}

struct Attachment {
	root: Element,
	click: Closure<dyn Fn(web_sys::Event)>,
	change: Option<Closure<dyn Fn(web_sys::Event)>>,
}

/// Handles collection action triggers below a root element.
///
/// Clicks on [`data-collection-action`](`attributes::ACTION`) triggers are delegated from the root, so rows added
/// later need no setup of their own. Listeners registered with [`on`](`CollectionWidget::on`) run in registration
/// order for each [`Phase`] and may inspect, override or cancel the action.
///
/// The DOM listeners are removed on [`detach`](`CollectionWidget::detach`) or when the widget is dropped.
pub struct CollectionWidget {
	shared: Rc<Shared>,
	attachment: Option<Attachment>,
}

impl fmt::Debug for CollectionWidget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CollectionWidget")
			.field("options", &self.shared.options)
			.field("listener_count", &self.shared.listeners.borrow().values().map(Vec::len).sum::<usize>())
			.field("root", &self.attachment.as_ref().map(|attachment| &attachment.root))
			.finish()
	}
}

impl Default for CollectionWidget {
	fn default() -> Self {
		Self::new(Options::default())
	}
}

impl CollectionWidget {
	#[must_use]
	pub fn new(options: Options) -> Self {
		Self {
			shared: Rc::new(Shared {
				options,
				listeners: RefCell::default(),
				next_listener_id: Cell::new(0),
			}),
			attachment: None,
		}
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.shared.options
	}

	/// Starts handling triggers below (and including) `root`, and updates the buttons of every collection there.
	///
	/// A widget that is already attached elsewhere is detached first.
	///
	/// # Errors
	///
	/// Iff updating the buttons or registering the DOM listeners fails. The widget is left detached in that case.
	#[instrument(skip(self))]
	pub fn attach(&mut self, root: Element) -> Result<()> {
		if self.attachment.is_some() {
			warn!("Attaching a widget that is already attached. Detaching it first.");
			self.detach();
		}

		buttons::update_all(&root, self.shared.options.get_hidden_class())?;

		let click = {
			let shared = Rc::clone(&self.shared);
			let root = root.clone();
			Closure::wrap(Box::new(move |event: web_sys::Event| shared.on_click(&root, &event)) as Box<dyn Fn(web_sys::Event)>)
		};
		root.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;

		let change = if self.shared.options.get_propagate_values() {
			let change = Closure::wrap(Box::new(on_change) as Box<dyn Fn(web_sys::Event)>);
			if let Err(error) = root.add_event_listener_with_callback("change", change.as_ref().unchecked_ref()) {
				if let Err(error) = root.remove_event_listener_with_callback("click", click.as_ref().unchecked_ref()) {
					error!("Failed to remove click listener: {:?}", error);
				}
				return Err(error.into());
			}
			Some(change)
		} else {
			None
		};

		debug!("Attached.");
		self.attachment = Some(Attachment { root, click, change });
		Ok(())
	}

	/// Stops handling triggers. Returns the former root, if the widget was attached.
	#[instrument(skip(self))]
	pub fn detach(&mut self) -> Option<Element> {
		let Attachment { root, click, change } = self.attachment.take()?;
		if let Err(error) = root.remove_event_listener_with_callback("click", click.as_ref().unchecked_ref()) {
			error!("Failed to remove click listener: {:?}", error);
		}
		if let Some(change) = change {
			if let Err(error) = root.remove_event_listener_with_callback("change", change.as_ref().unchecked_ref()) {
				error!("Failed to remove change listener: {:?}", error);
			}
		}
		debug!("Detached.");
		Some(root)
	}

	#[must_use]
	pub fn is_attached(&self) -> bool {
		self.attachment.is_some()
	}

	#[must_use]
	pub fn root(&self) -> Option<&Element> {
		self.attachment.as_ref().map(|attachment| &attachment.root)
	}

	/// Registers `listener` for `action` in `phase`.
	///
	/// Listeners may call [`CollectionEvent::cancel`] (except in [`Phase::After`]) or override values through the
	/// event's setters. Returning an error aborts the action.
	///
	/// Listeners added or removed while an action is being dispatched take effect with the next action.
	pub fn on(&self, action: Action, phase: Phase, listener: impl 'static + Fn(&mut CollectionEvent) -> Result<()>) -> ListenerId {
		self.shared.register(Some(action), phase, Rc::new(listener))
	}

	/// Registers `listener` for every action in `phase`.
	pub fn on_any(&self, phase: Phase, listener: impl 'static + Fn(&mut CollectionEvent) -> Result<()>) -> ListenerId {
		self.shared.register(None, phase, Rc::new(listener))
	}

	/// Returns whether a listener was removed.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		let mut listeners = self.shared.listeners.borrow_mut();
		for registrations in listeners.values_mut() {
			if let Some(i) = registrations.iter().position(|registration| registration.id == id) {
				registrations.remove(i);
				return true;
			}
		}
		false
	}

	/// Runs `event` through all phases and performs its mutation unless canceled.
	///
	/// This works whether or not the widget is attached.
	///
	/// # Errors
	///
	/// Iff a value can't be resolved, a listener fails or the mutation fails.
	/// Errors before the mutation leave the DOM untouched.
	pub fn dispatch(&self, event: CollectionEvent) -> Result<Outcome> {
		self.shared.dispatch(event)
	}

	/// Dispatches `action` as if `trigger` had been clicked.
	///
	/// # Errors
	///
	/// As [`dispatch`](`CollectionWidget::dispatch`).
	pub fn trigger(&self, action: Action, trigger: Element) -> Result<Outcome> {
		self.dispatch(CollectionEvent::from_trigger(action, trigger, None))
	}
}

impl Drop for CollectionWidget {
	fn drop(&mut self) {
		self.detach();
	}
}

impl Shared {
	fn register(&self, action: Option<Action>, phase: Phase, listener: Rc<Listener>) -> ListenerId {
		let id = ListenerId(self.next_listener_id.get());
		self.next_listener_id.set(id.0 + 1);
		self.listeners.borrow_mut().entry(phase).or_default().push(Registration { id, action, listener });
		id
	}

	fn on_click(&self, root: &Element, event: &web_sys::Event) {
		let target = match event.target().and_then(|target| target.dyn_into::<Element>().ok()) {
			Some(target) => target,
			None => return,
		};
		let trigger = match target.closest(attributes::ACTION_SELECTOR) {
			Ok(Some(trigger)) => trigger,
			Ok(None) => return,
			Err(error) => {
				error!("Failed to look for a collection action: {:?}", error);
				return;
			}
		};
		let trigger_node: &Node = &trigger;
		if !root.contains(Some(trigger_node)) {
			trace!("Ignoring a collection action outside the widget's root.");
			return;
		}

		let action = match trigger.get_attribute(attributes::ACTION).unwrap_or_default().parse::<Action>() {
			Ok(action) => action,
			Err(error) => {
				error!("{}", error);
				return;
			}
		};
		if let Err(error) = self.dispatch(CollectionEvent::from_trigger(action, trigger, Some(event.clone()))) {
			error!("collection.node.{} failed: {}", action, error);
		}
	}

	fn dispatch(&self, mut event: CollectionEvent) -> Result<Outcome> {
		let action = event.action();
		let span = debug_span!("Collection action", %action);
		let _enter = span.enter();

		// Registry changes made by listeners apply to the next action.
		let listeners = self.snapshot(action);

		self.emit(&listeners, &mut event)?;
		if event.is_canceled() {
			debug!("Canceled in action phase.");
			return Ok(Outcome::Canceled(Phase::Action));
		}

		let mut before = event.derive(Phase::Before);
		if action == Action::Add {
			// The new row doesn't exist yet.
			before.set_node(None);
		}
		self.emit(&listeners, &mut before)?;
		if before.is_canceled() {
			debug!("Canceled in before phase.");
			return Ok(Outcome::Canceled(Phase::Before));
		}

		// Pin everything the mutation needs, so the after phase still refers to it.
		let collection = before.collection()?;
		let node = match action {
			Action::Add => rows::add(&collection, &before.prototype_name()?, &before.prototype()?)?,
			Action::Insert => {
				let position = match before.position()? {
					Some(position) => position,
					None => match rows::last_index(&collection)? {
						Some(last) => shifted(last, 1)?,
						None => 0,
					},
				};
				before.set_position(Some(position));
				rows::insert(&collection, &before.prototype_name()?, &before.prototype()?, position)?
			}
			Action::Delete => {
				let node = required_node(&mut before)?;
				rows::delete(&collection, &node)?;
				node
			}
			Action::Up => {
				let node = required_node(&mut before)?;
				rows::move_up(&collection, &node)?;
				node
			}
			Action::Down => {
				let node = required_node(&mut before)?;
				rows::move_down(&collection, &node)?;
				node
			}
			Action::Duplicate => {
				let node = required_node(&mut before)?;
				rows::duplicate(&collection, &node)?
			}
		};

		let mut after = before.derive(Phase::After);
		after.set_node(Some(node.clone()));

		buttons::update_collection_buttons(&collection, self.options.get_hidden_class())?;
		if action.creates_row() && self.options.get_scroll_into_view() {
			scroll_into_view(&node);
		}

		self.emit(&listeners, &mut after)?;
		Ok(Outcome::Completed(after))
	}

	/// The listeners for `action`, per phase, as registered right now.
	fn snapshot(&self, action: Action) -> HashMap<Phase, Vec<Rc<Listener>>> {
		self.listeners
			.borrow()
			.iter()
			.map(|(phase, registrations)| {
				let listeners: Vec<Rc<Listener>> = registrations
					.iter()
					.filter(|registration| registration.action.map_or(true, |filter| filter == action))
					.map(|registration| Rc::clone(&registration.listener))
					.collect();
				(*phase, listeners)
			})
			.collect()
	}

	/// Runs the snapshotted listeners for `event`'s phase, then raises it as DOM event.
	#[instrument(skip(self, listeners, event), fields(phase = ?event.phase()))]
	fn emit(&self, listeners: &HashMap<Phase, Vec<Rc<Listener>>>, event: &mut CollectionEvent) -> Result<()> {
		let (action, phase) = (event.action(), event.phase());
		let listeners = listeners.get(&phase).map_or(&[][..], Vec::as_slice);
		trace!("Running {} listener(s).", listeners.len());

		for listener in listeners {
			listener(event)?;
		}

		if self.options.get_dom_events() {
			let target = match (phase, event.target()) {
				(Phase::Action | Phase::Before, Some(target)) => target.clone(),
				_ => event.collection()?,
			};
			let init = CustomEventInit::new();
			init.set_bubbles(true);
			init.set_cancelable(phase.is_cancelable());
			let event_detail: JsValue = detail(event)?.into();
			init.set_detail(&event_detail);
			let dom_event = CustomEvent::new_with_event_init_dict(&action.event_name(phase), &init)?;
			if !target.dispatch_event(&dom_event)? && phase.is_cancelable() {
				debug!("DOM listener prevented the default action.");
				event.cancel();
			}
		}
		Ok(())
	}
}

/// `{ collection, node }` as far as they are resolved, for JavaScript listeners.
fn detail(event: &CollectionEvent) -> Result<Object> {
	let detail = Object::new();
	if let Some(collection) = event.resolved_collection() {
		Reflect::set(&detail, &JsValue::from_str("collection"), collection)?;
	}
	if let Some(node) = event.resolved_node() {
		Reflect::set(&detail, &JsValue::from_str("node"), node)?;
	}
	Ok(detail)
}

fn required_node(event: &mut CollectionEvent) -> Result<Element> {
	event.node()?.ok_or_else(|| Error::Resolution(format!("collection.node.{} requires a row, but none was found or set", event.action())))
}

fn scroll_into_view(row: &Element) {
	let options = ScrollIntoViewOptions::new();
	options.set_behavior(ScrollBehavior::Smooth);
	options.set_block(ScrollLogicalPosition::Nearest);
	options.set_inline(ScrollLogicalPosition::Nearest);
	row.scroll_into_view_with_scroll_into_view_options(&options);
}

fn on_change(event: web_sys::Event) {
	if let Some(control) = event.target().and_then(|target| target.dyn_into::<Element>().ok()) {
		if let Err(error) = values::propagate(&control) {
			error!("Failed to propagate a form control's state: {}", error);
		}
	}
}
