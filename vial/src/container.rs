use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::{Error, Inject, Resolver, StdError};

/// Shared, type-erased value of a parameter or a service instance.
///
/// The container never inspects values; callers downcast them, usually through
/// [`ResolverExt::param_as`](crate::ResolverExt::param_as) and
/// [`ResolverExt::service_as`](crate::ResolverExt::service_as).
pub type Value = Arc<dyn Any + Send + Sync>;

/// Type-erased service factory.
pub type Factory = Arc<dyn Fn(&dyn Resolver) -> Result<Value, StdError> + Send + Sync>;

/// Dependency injection container holding parameters and services.
///
/// Parameters are plain values. Services are defined by factories and are only
/// instantiated when first requested, after which the same instance is returned
/// to every caller. Storing definitions does not create instances, so services may
/// be registered before the services they depend on.
///
/// The container has two phases. While building, [`store`](Container::store) and
/// [`register`](Container::register) define its contents. After
/// [`freeze`](Container::freeze) definitions can no longer change and the container
/// can be shared between threads for lookups.
///
/// # Examples
///
/// ```rust
/// use vial::{Container, ResolverExt as _};
///
/// let mut dic = Container::new();
/// dic.register("s1", |_| Ok("s1".to_string()));
/// dic.register("s2", |r| {
///     let s1 = r.service_as::<String>("s1")?;
///     Ok(format!("{s1}s2"))
/// });
/// dic.freeze();
///
/// let s2 = dic.service_as::<String>("s2").unwrap();
/// assert_eq!(s2.as_str(), "s1s2");
/// ```
pub struct Container {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    frozen: bool,
    parameters: HashMap<String, Value>,
    service_defs: HashMap<String, Factory>,
    services: HashMap<String, Value>,
}

/// Sorted names of all defined parameters and services.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Names {
    pub params: Vec<String>,
    pub services: Vec<String>,
}

impl Container {
    /// Creates an empty, unfrozen container.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Stores a parameter, replacing any previous value with the same name.
    ///
    /// # Panics
    ///
    /// Panics if the container is frozen.
    pub fn store<T>(&mut self, name: impl Into<String>, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.store_value(name, Arc::new(value))
    }

    /// Stores an already shared parameter value.
    ///
    /// # Panics
    ///
    /// Panics if the container is frozen.
    pub fn store_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        let tables = self.tables.get_mut();
        if tables.frozen {
            panic!("Cannot store parameters on frozen container");
        }
        tables.parameters.insert(name.into(), value);
        self
    }

    /// Registers a service factory, replacing any previous factory with the same name.
    ///
    /// The factory is not invoked until the service is first requested. It receives a
    /// [`Resolver`] to look up its own dependencies.
    ///
    /// # Panics
    ///
    /// Panics if the container is frozen.
    pub fn register<F, T>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&dyn Resolver) -> Result<T, StdError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register_factory(
            name,
            Arc::new(move |resolver: &dyn Resolver| -> Result<Value, StdError> {
                Ok(Arc::new(factory(resolver)?) as Value)
            }),
        )
    }

    /// Registers a type-erased factory.
    ///
    /// # Panics
    ///
    /// Panics if the container is frozen.
    pub fn register_factory(&mut self, name: impl Into<String>, factory: Factory) -> &mut Self {
        let tables = self.tables.get_mut();
        if tables.frozen {
            panic!("Cannot register services on frozen container");
        }
        tables.service_defs.insert(name.into(), factory);
        self
    }

    /// Registers `T::inject` as the factory of a service.
    ///
    /// # Panics
    ///
    /// Panics if the container is frozen.
    pub fn register_inject<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: Inject + Send + Sync + 'static,
    {
        self.register(name, T::inject)
    }

    /// Freezes the container, permanently disabling [`store`](Container::store)
    /// and [`register`](Container::register).
    pub fn freeze(&mut self) -> &mut Self {
        self.tables.get_mut().frozen = true;
        self
    }

    /// Checks whether the container has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.tables.read().frozen
    }

    /// Returns the parameter stored under `name`.
    pub fn param(&self, name: &str) -> Result<Value, Error> {
        self.tables
            .read()
            .parameters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ParameterNotFound(name.to_owned()))
    }

    /// Returns the parameter stored under `name`.
    ///
    /// # Panics
    ///
    /// Panics if the parameter is missing.
    pub fn must_param(&self, name: &str) -> Value {
        self.param(name).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns the single instance of the service registered under `name`.
    ///
    /// The first call invokes the factory, which may in turn request other services;
    /// on success the instance is cached and returned by every later call. Failed
    /// instantiations are not cached.
    pub fn service(&self, name: &str) -> Result<Value, Error> {
        self.resolve(name, None)
    }

    /// Returns the single instance of the service registered under `name`.
    ///
    /// # Panics
    ///
    /// Panics if the service is missing or cannot be instantiated.
    pub fn must_service(&self, name: &str) -> Value {
        self.service(name).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns the names of all stored parameters and registered services, sorted.
    ///
    /// Services are listed whether or not they have been instantiated.
    pub fn names(&self) -> Names {
        let tables = self.tables.read();
        let mut params: Vec<_> = tables.parameters.keys().cloned().collect();
        let mut services: Vec<_> = tables.service_defs.keys().cloned().collect();
        drop(tables);
        params.sort_unstable();
        services.sort_unstable();
        Names { params, services }
    }

    fn resolve(&self, name: &str, parent: Option<&Resolution<'_>>) -> Result<Value, Error> {
        let factory = {
            let tables = self.tables.read();
            if let Some(instance) = tables.services.get(name) {
                tracing::trace!(service = name, "Reusing service instance");
                return Ok(instance.clone());
            }
            match tables.service_defs.get(name) {
                Some(v) => v.clone(),
                None => return Err(Error::ServiceNotFound(name.to_owned())),
            }
        };
        if let Some(parent) = parent
            && parent.contains(name)
        {
            return Err(Error::CircularDependency(parent.path_to(name)));
        }
        let resolution = Resolution {
            container: self,
            name,
            parent,
        };
        tracing::debug!(service = name, "Instantiating service");
        let instance = factory(&resolution).map_err(|source| Error::Instantiation {
            name: name.to_owned(),
            source,
        })?;
        // The first instance written wins, so racing callers share it.
        let mut tables = self.tables.write();
        Ok(tables
            .services
            .entry(name.to_owned())
            .or_insert(instance)
            .clone())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        let tables = self.tables.read();
        let mut instances: Vec<_> = tables.services.keys().collect();
        instances.sort_unstable();
        f.debug_struct("Container")
            .field("frozen", &tables.frozen)
            .field("names", &names)
            .field("instances", &instances)
            .finish()
    }
}

impl Resolver for Container {
    fn param(&self, name: &str) -> Result<Value, Error> {
        Container::param(self, name)
    }

    fn service(&self, name: &str) -> Result<Value, Error> {
        Container::service(self, name)
    }
}

/// Resolver handed to a factory while its service is being built.
///
/// Links to the resolution that requested it, forming the chain used to detect
/// circular dependencies.
struct Resolution<'a> {
    container: &'a Container,
    name: &'a str,
    parent: Option<&'a Resolution<'a>>,
}

impl Resolution<'_> {
    fn ancestors(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |v| v.parent)
    }

    fn contains(&self, name: &str) -> bool {
        self.ancestors().any(|v| v.name == name)
    }

    fn path_to(&self, name: &str) -> Vec<String> {
        let mut path: Vec<_> = self.ancestors().map(|v| v.name.to_owned()).collect();
        path.reverse();
        path.push(name.to_owned());
        path
    }
}

impl Resolver for Resolution<'_> {
    fn param(&self, name: &str) -> Result<Value, Error> {
        self.container.param(name)
    }

    fn service(&self, name: &str) -> Result<Value, Error> {
        self.container.resolve(name, Some(self))
    }
}
