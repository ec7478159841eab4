use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// A collection or row could not be located from the trigger's context.
	#[error("resolution error: {0}")]
	Resolution(String),

	/// Prototype markup or its placeholder token is missing.
	#[error("configuration error: {0}")]
	Configuration(String),

	#[error("invalid collection action {0:?}. Valid options are: add, insert, delete, up, down, duplicate")]
	InvalidAction(String),

	#[error("invalid row index {value:?} in `data-collection-index`")]
	InvalidIndex { value: Option<String> },

	#[error("row index {index} shifted by {delta} is out of range")]
	IndexOutOfRange { index: u32, delta: i64 },

	#[error("insert position {position} is beyond the end of a collection with {len} row(s)")]
	PositionOutOfRange { position: u32, len: usize },

	#[error("prototype markup did not produce a single row with index {index}")]
	Template { index: u32 },

	#[error("DOM error: {0}")]
	Dom(String),

	/// Raised by host listeners to abort an action.
	#[error("listener error: {0}")]
	Listener(String),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Self::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
	}
}
