use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use vial::{Container, Resolver, ResolverExt as _, StdError};

/// Name of the container parameter holding the application [`Config`].
pub const CONFIG_PARAM: &str = "config";

/// Application configuration made of named JSON sections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub(crate) configs: BTreeMap<String, Value>,
}

/// Typed configuration section stored under a fixed key.
pub trait ConfigSection: DeserializeOwned {
    fn key() -> &'static str;
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes the section `name`; a missing section deserializes from `null`,
    /// so `Option<T>` reads as `None`.
    pub fn get<T>(&self, name: impl AsRef<str>) -> Result<T, StdError>
    where
        T: DeserializeOwned,
    {
        let value = match self.configs.get(name.as_ref()) {
            Some(v) => T::deserialize(v)?,
            None => serde_json::from_value(Value::Null)?,
        };
        Ok(value)
    }

    /// Deserializes the section stored under `T::key()`.
    pub fn section<T>(&self) -> Result<T, StdError>
    where
        T: ConfigSection,
    {
        self.get(T::key())
    }

    /// Replaces the section `name` with the JSON form of `value`.
    pub fn set<T>(&mut self, name: impl Into<String>, value: T) -> Result<(), StdError>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value)?;
        self.configs.insert(name.into(), value);
        Ok(())
    }

    /// Builder variant of [`set`](Config::set).
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be represented as JSON.
    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        if let Err(err) = self.set(name, value) {
            panic!("Cannot serialize config value: {err}");
        }
        self
    }

    /// Merges `other` into this config: objects are merged recursively, arrays are
    /// appended and any other value is replaced.
    pub fn merge_from(&mut self, other: Self) {
        for (key, value) in other.configs {
            merge_value(self.configs.entry(key).or_insert(Value::Null), value);
        }
    }

    /// Parses a JSON object whose keys are section names.
    pub fn parse(text: impl AsRef<str>) -> Result<Self, StdError> {
        let config = serde_json::from_str(text.as_ref())?;
        Ok(config)
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, StdError> {
        let path = path.as_ref();
        tracing::debug!(path = ?path, "Reading config file");
        let text = std::fs::read_to_string(path)
            .map_err(|err| format!("Cannot read config file {}: {err}", path.display()))?;
        Self::parse(text)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Number of top-level sections.
    pub fn len(&self) -> usize {
        self.configs.len()
    }
}

fn merge_value(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                merge_value(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (Value::Array(target), Value::Array(source)) => target.extend(source),
        (target, source) => *target = source,
    }
}

/// Extension trait for storing a [`Config`] as a container parameter.
pub trait StoreConfigExt {
    /// Stores `config` under [`CONFIG_PARAM`].
    fn store_config(&mut self, config: Config) -> &mut Self;
}

impl StoreConfigExt for Container {
    fn store_config(&mut self, config: Config) -> &mut Self {
        self.store(CONFIG_PARAM, config)
    }
}

/// Extension trait for reading configuration sections from a resolver.
///
/// ```rust
/// use serde::Deserialize;
/// use vial::{Container, ResolverExt as _};
/// use vial_base::{Config, ConfigResolverExt as _, ConfigSection, StoreConfigExt as _};
///
/// #[derive(Deserialize)]
/// struct ServerConfig {
///     port: u16,
/// }
///
/// impl ConfigSection for ServerConfig {
///     fn key() -> &'static str {
///         "server"
///     }
/// }
///
/// let mut dic = Container::new();
/// dic.store_config(Config::parse(r#"{"server": {"port": 8080}}"#).unwrap());
/// dic.register("port", |r| Ok(r.config_section::<ServerConfig>()?.port));
/// assert_eq!(*dic.must_service_as::<u16>("port"), 8080);
/// ```
pub trait ConfigResolverExt: Resolver {
    /// Returns the stored [`Config`].
    fn config(&self) -> Result<std::sync::Arc<Config>, StdError> {
        Ok(self.param_as::<Config>(CONFIG_PARAM)?)
    }

    /// Deserializes section `T` of the stored [`Config`].
    fn config_section<T>(&self) -> Result<T, StdError>
    where
        T: ConfigSection,
    {
        self.config()?.section()
    }
}

impl<R> ConfigResolverExt for R where R: Resolver + ?Sized {}
