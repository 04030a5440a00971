//! Form fields and request building

pub mod builder;
pub mod fields;
