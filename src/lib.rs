#![doc(html_root_url = "https://docs.rs/form-collection-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Row management for server-rendered form collections.
//!
//! A collection is an element marked with [`data-collection="collection"`](`attributes::COLLECTION`) whose direct
//! children marked [`data-collection="node"`](`attributes::NODE`) are its rows.
//! Each row carries its position in [`data-collection-index`](`attributes::INDEX`), and that position is mirrored into
//! the row's `id`, its [`data-full-name`](`attributes::FULL_NAME`) and any index labels.
//!
//! [`CollectionWidget`] listens for clicks on [`data-collection-action`](`attributes::ACTION`) triggers and runs each
//! [`Action`] through an [`Action`](`Phase::Action`) → [`Before`](`Phase::Before`) → mutation → [`After`](`Phase::After`)
//! pipeline of listeners. The mutations themselves are available directly in [`rows`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod attributes;
pub mod buttons;
mod error;
pub mod event;
pub mod index;
mod options;
pub mod rows;
pub mod template;
pub mod values;
mod widget;

pub use error::{Error, Result};
pub use event::{Action, CollectionEvent, Phase};
pub use options::Options;
pub use widget::{CollectionWidget, ListenerId, Outcome};
