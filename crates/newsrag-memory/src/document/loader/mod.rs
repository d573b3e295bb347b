mod web;

pub use web::{LoaderConfig, WebLoader};
