use std::fmt;

/// Type alias for boxed errors that can be sent across threads.
///
/// Factories return this error type, so any error implementing
/// `std::error::Error + Send + Sync` can be propagated with `?`.
pub type StdError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by container lookups and service resolution.
#[derive(Debug)]
pub enum Error {
    /// No parameter is stored under the name.
    ParameterNotFound(String),
    /// No service factory is registered under the name.
    ServiceNotFound(String),
    /// Resolving a service required resolving itself first.
    ///
    /// Holds the resolution chain, ending with the repeated name.
    CircularDependency(Vec<String>),
    /// The value stored under the name has a different type than requested.
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
    /// The factory of the named service failed.
    Instantiation { name: String, source: StdError },
}

impl Error {
    /// Checks whether this error, or any error it wraps, is a circular dependency.
    pub fn is_circular_dependency(&self) -> bool {
        self.chain()
            .any(|err| matches!(err, Error::CircularDependency(_)))
    }

    /// Checks whether this error, or any error it wraps, is a missing parameter or service.
    pub fn is_not_found(&self) -> bool {
        self.chain().any(|err| {
            matches!(
                err,
                Error::ParameterNotFound(_) | Error::ServiceNotFound(_)
            )
        })
    }

    /// Iterates over this error and every container error in its source chain.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut next: Option<&(dyn std::error::Error + 'static)> = Some(self);
        std::iter::from_fn(move || {
            while let Some(err) = next {
                next = err.source();
                if let Some(err) = err.downcast_ref::<Error>() {
                    return Some(err);
                }
            }
            None
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParameterNotFound(name) => write!(f, "parameter not found: {name:?}"),
            Error::ServiceNotFound(name) => write!(f, "service not found: {name:?}"),
            Error::CircularDependency(path) => {
                write!(f, "circular dependency detected: {}", path.join(" -> "))
            }
            Error::TypeMismatch { name, expected } => {
                write!(f, "value {name:?} is not of type {expected}")
            }
            Error::Instantiation { name, source } => {
                write!(f, "failed instantiating service {name}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Instantiation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
