pub mod admin;
pub mod app;
pub mod collection;
pub mod config;
pub mod error;
pub mod import;
pub mod item;
pub mod provider;
pub mod search;
pub mod session;
pub mod view;

pub use app::Library;
pub use error::LibraryError;
pub use provider::api::rest::Client;
