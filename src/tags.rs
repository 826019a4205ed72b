//! Tags
//!
//! Products carry free-form tags. The shop stores them as one comma-delimited string;
//! they are split once into a [`collection::TagCollection`] when a product is built.

pub mod collection;
pub mod string;
