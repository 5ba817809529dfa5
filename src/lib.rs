//! Query-state engine for paged, sorted and filtered list views.
//!
//! A [`ListSource`] owns the current [`QueryParams`], debounces changes to
//! them, calls a [`Loader`], and publishes busy, error and page state on
//! watch channels. Optional pieces wrap or observe it:
//!
//! - [`TableSource`](table::TableSource): single-column sort toggles
//! - [`FilterFormBridge`](form::FilterFormBridge): form value ↔ filter
//! - [`PersistedParamsSynchronizer`](persist::PersistedParamsSynchronizer):
//!   restore and save params
//! - [`CommandLoader`](command::CommandLoader): command-style sources as loaders
//! - [`project`](projector::project): in-memory sort/filter/page for local data

pub mod command;
pub mod config;
mod debounce;
pub mod error;
pub mod form;
pub mod params;
pub mod persist;
pub mod projector;
pub mod source;
pub mod store;
pub mod table;

pub use config::EngineConfig;
pub use error::{ConfigError, LoadError, PersistError};
pub use params::{ListResult, Ordering, ParamsPatch, QueryParams, SortDirection};
pub use source::{ListSource, Loader, QuerySource};
