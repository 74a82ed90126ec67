//! Read-only access to a container for factories and application code.
//!
//! Factories never see the [`Container`](crate::Container) itself: they receive a
//! [`Resolver`] that can only look up parameters and services. Typed lookups and the
//! panicking `must_*` variants are provided for every resolver by [`ResolverExt`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use vial::{Container, ResolverExt as _};
//!
//! let mut dic = Container::new();
//! dic.store("greeting", "Hello".to_string());
//! dic.register("message", |r| {
//!     let greeting = r.param_as::<String>("greeting")?;
//!     Ok(format!("{greeting}, World!"))
//! });
//! dic.freeze();
//!
//! let message: Arc<String> = dic.must_service_as("message");
//! assert_eq!(message.as_str(), "Hello, World!");
//! ```

use std::any::type_name;
use std::sync::Arc;

use crate::{Error, StdError, Value};

/// Lookup capability handed to service factories.
///
/// Implemented by [`Container`](crate::Container) and by the handle of an in-flight
/// resolution, which additionally tracks the chain of services being built so that
/// circular dependencies are reported instead of recursing forever.
pub trait Resolver: Send + Sync {
    /// Returns the parameter stored under `name`.
    fn param(&self, name: &str) -> Result<Value, Error>;

    /// Returns the single instance of the service registered under `name`,
    /// instantiating it on first use.
    fn service(&self, name: &str) -> Result<Value, Error>;
}

/// Typed and panicking accessors available on every [`Resolver`].
pub trait ResolverExt: Resolver {
    /// Returns the parameter stored under `name` downcast to `T`.
    fn param_as<T>(&self, name: &str) -> Result<Arc<T>, Error>
    where
        T: Send + Sync + 'static,
    {
        downcast(name, self.param(name)?)
    }

    /// Returns the service registered under `name` downcast to `T`.
    fn service_as<T>(&self, name: &str) -> Result<Arc<T>, Error>
    where
        T: Send + Sync + 'static,
    {
        downcast(name, self.service(name)?)
    }

    /// Returns the parameter stored under `name`.
    ///
    /// # Panics
    ///
    /// Panics with the lookup error if the parameter is missing.
    fn must_param(&self, name: &str) -> Value {
        self.param(name).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns the service registered under `name`.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error if the service is missing or cannot be built.
    fn must_service(&self, name: &str) -> Value {
        self.service(name).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Typed variant of [`must_param`](ResolverExt::must_param).
    fn must_param_as<T>(&self, name: &str) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.param_as(name).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Typed variant of [`must_service`](ResolverExt::must_service).
    fn must_service_as<T>(&self, name: &str) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.service_as(name).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl<R> ResolverExt for R where R: Resolver + ?Sized {}

fn downcast<T>(name: &str, value: Value) -> Result<Arc<T>, Error>
where
    T: Send + Sync + 'static,
{
    value.downcast::<T>().map_err(|_| Error::TypeMismatch {
        name: name.to_owned(),
        expected: type_name::<T>(),
    })
}

/// Types that can build themselves from a [`Resolver`].
///
/// This is the typed counterpart of a service factory: a struct whose fields are
/// parameters and services of a container. With the `macros` feature it can be derived:
///
/// ```rust
/// use std::sync::Arc;
/// use vial::{Container, Inject, ResolverExt as _};
///
/// struct Database {
///     url: String,
/// }
///
/// #[derive(Inject)]
/// struct Repository {
///     #[param("table")]
///     table: String,
///     #[service("database")]
///     database: Arc<Database>,
/// }
///
/// let mut dic = Container::new();
/// dic.store("table", "users".to_string());
/// dic.register("database", |_| Ok(Database { url: "sqlite::memory:".into() }));
/// dic.register_inject::<Repository>("repository");
/// dic.freeze();
///
/// let repository = dic.must_service_as::<Repository>("repository");
/// assert_eq!(repository.table, "users");
/// assert_eq!(repository.database.url, "sqlite::memory:");
/// ```
pub trait Inject: Sized {
    /// Builds a value from parameters and services of the resolver.
    fn inject(resolver: &dyn Resolver) -> Result<Self, StdError>;
}
