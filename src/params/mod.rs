//! Query params: the paging, ordering and filter intent that drives a fetch.

mod compare;
mod patch;
mod types;

pub use compare::{deep_equal, deep_equal_json, shallow_equal_coalesced, to_json};
pub use patch::ParamsPatch;
pub use types::{ListResult, Ordering, QueryParams, SortDirection};
