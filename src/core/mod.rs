//! Core notebook engine: document model, normalization, mutations, history
//! and the store that ties them together

pub mod config;
pub mod events;
pub mod history;
pub mod model;
pub mod normalize;
pub mod ops;
pub mod store;
