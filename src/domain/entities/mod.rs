//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Creation and partial updates use
//! separate input structs:
//!
//! - [`Link`] / [`NewLink`] / [`LinkPatch`] - a link in an owner's collection
//! - [`LinkCollection`] - an owner's ordered collection with its version
//! - [`ClickEvent`] / [`NewClick`] - an immutable entry in the click log

pub mod click;
pub mod link;

pub use click::{ClickAppend, ClickEvent, DEDUP_TOKEN_MAX_LEN, NewClick};
pub use link::{
    DEFAULT_ICON, ICON_MAX_CHARS, Link, LinkCollection, LinkPatch, MAX_LINKS_PER_OWNER, NewLink,
    TITLE_MAX_CHARS, collection_full,
};
