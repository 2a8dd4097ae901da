//! A batched concurrent HTTP request driver with ordered delivery and a
//! pluggable response cache.
//!
//! Requests go in as a `Vec<request::RequestRecord>`, responses come out
//! one at a time, in submission order, while up to `batch_size` of them
//! are in flight at once. See [`dispatcher::Dispatcher`] for the core
//! entry point and [`resource`] for the ergonomic per-method front.

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod queue;
pub mod request;
pub mod resource;
pub mod response;

pub use cache::{Cache, MemoryCache, NoCache};
pub use config::DriverConfig;
pub use dispatcher::{Dispatcher, ResponseDriver};
pub use error::{DecodeError, Error, UsageError};
pub use fingerprint::Fingerprint;
pub use request::{Body, Method, RequestRecord};
pub use resource::Resource;
pub use response::ResponseRecord;
