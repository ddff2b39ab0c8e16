pub mod api;
pub mod export;
pub mod model;
pub mod portal;
pub mod probe;
pub mod settings;

pub use api::Error;
