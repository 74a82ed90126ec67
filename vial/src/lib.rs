//! # vial
//!
//! A minimal dependency injection container separating **parameters** from **services**.
//!
//! ## Core Concepts
//!
//! - **Parameters**: Named values without dependencies, stored with [`Container::store`]
//! - **Services**: Named factories registered with [`Container::register`], instantiated
//!   lazily on first request and cached for the lifetime of the container
//! - **Resolver**: The read-only view factories receive to request their own dependencies
//! - **Freeze**: The one-way switch from the build phase to the concurrent lookup phase
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use vial::{Container, ResolverExt as _};
//!
//! struct Logger {
//!     prefix: String,
//! }
//!
//! struct Greeter {
//!     logger: Arc<Logger>,
//!     name: Arc<String>,
//! }
//!
//! let mut dic = Container::new();
//! dic.store("prefix", "[app] ".to_string());
//! dic.store("name", "World".to_string());
//! // Greeter is registered before its Logger dependency.
//! dic.register("greeter", |r| {
//!     Ok(Greeter {
//!         logger: r.service_as("logger")?,
//!         name: r.param_as("name")?,
//!     })
//! });
//! dic.register("logger", |r| {
//!     let prefix = r.param_as::<String>("prefix")?;
//!     Ok(Logger { prefix: prefix.to_string() })
//! });
//! dic.freeze();
//!
//! let greeter = dic.must_service_as::<Greeter>("greeter");
//! assert_eq!(format!("{}Hello, {}!", greeter.logger.prefix, greeter.name), "[app] Hello, World!");
//! ```
//!
//! ## Errors
//!
//! Missing names, failing factories and circular dependencies are reported as [`Error`]
//! values. The `must_*` accessors turn them into panics for bootstrap code that cannot
//! continue without the requested entry:
//!
//! ```rust
//! use vial::{Container, Error};
//!
//! let mut dic = Container::new();
//! dic.register("a", |r| r.service("b").map(|_| ()).map_err(Into::into));
//! dic.register("b", |r| r.service("a").map(|_| ()).map_err(Into::into));
//!
//! let err = dic.service("a").unwrap_err();
//! assert!(err.is_circular_dependency());
//! assert!(matches!(dic.param("missing"), Err(Error::ParameterNotFound(_))));
//! ```
//!
//! ## Features
//!
//! - `macros` (default): Enables `#[derive(Inject)]` for structs built from a resolver

mod container;
mod error;
mod resolver;

pub use container::*;
pub use error::*;
pub use resolver::*;

#[cfg(feature = "macros")]
pub use vial_macros::*;
