// Adapters layer: concrete implementations of the domain ports against the REST backend.

pub mod checks;
pub mod rest;
