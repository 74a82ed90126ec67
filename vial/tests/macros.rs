use std::sync::Arc;

use vial::{Container, Error, Inject, Resolver, ResolverExt as _, StdError};

#[derive(Clone, Debug, PartialEq)]
struct Settings {
    verbose: bool,
}

struct Database {
    url: String,
}

#[derive(Inject)]
struct Repository {
    #[param("table")]
    table: String,
    #[param("settings")]
    settings: Settings,
    #[service("database")]
    database: Arc<Database>,
}

#[derive(Inject)]
struct Handler {
    #[service("repository")]
    repository: Arc<Repository>,
    #[param("settings")]
    settings: Arc<Settings>,
}

#[derive(Inject)]
struct Empty {}

fn database(r: &dyn Resolver) -> Result<Database, StdError> {
    Ok(Database {
        url: r.param_as::<String>("database_url")?.to_string(),
    })
}

fn container() -> Container {
    let mut dic = Container::new();
    dic.store("table", "users".to_string())
        .store("settings", Settings { verbose: true })
        .store("database_url", "sqlite::memory:".to_string())
        .register("database", database)
        .register_inject::<Repository>("repository")
        .register_inject::<Handler>("handler")
        .register_inject::<Empty>("empty");
    dic
}

#[test]
fn test_inject() {
    let mut dic = container();
    dic.freeze();
    let handler = dic.must_service_as::<Handler>("handler");
    let repository = dic.must_service_as::<Repository>("repository");
    assert!(Arc::ptr_eq(&handler.repository, &repository));
    assert_eq!(repository.table, "users");
    assert_eq!(repository.settings, Settings { verbose: true });
    assert_eq!(repository.database.url, "sqlite::memory:");
    assert!(handler.settings.verbose);
    assert!(dic.service_as::<Empty>("empty").is_ok());
}

#[test]
fn test_inject_direct() {
    let dic = container();
    let repository = Repository::inject(&dic).unwrap();
    assert_eq!(repository.table, "users");
    assert!(Arc::ptr_eq(
        &repository.database,
        &dic.must_service_as::<Database>("database")
    ));
}

#[test]
fn test_inject_missing_param() {
    let mut dic = Container::new();
    dic.register("database", database);
    dic.register_inject::<Repository>("repository");
    let err = dic.service("repository").unwrap_err();
    assert!(matches!(&err, Error::Instantiation { name, .. } if name == "repository"));
    assert!(err.is_not_found());
}

#[test]
fn test_inject_type_mismatch() {
    let mut dic = container();
    dic.store("table", 42u32);
    assert!(Repository::inject(&dic).is_err());
}
