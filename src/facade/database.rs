use crate::connection::{Config, Connector};
use crate::core::Result;
use crate::model::{Model, ModelRef};
use crate::query::Executor;
use crate::schema::{EntitySchema, EntitySchemaBuilder, Registry};
use std::sync::Arc;

/// Entry point: a connector, the registered entity types and the settings
/// that apply to both.
///
/// ```
/// use activerow::prelude::*;
/// use std::sync::Arc;
///
/// let mock = Arc::new(MockConnector::new());
/// let mut db = Database::new(Arc::clone(&mock));
/// db.register(EntitySchemaBuilder::new("User").field("name", FieldSpec::varchar(64)))?;
///
/// mock.push_outcome(1, Some(1));
/// let user = db.model("User")?.create(row([("name", "Ana")]), None)?;
/// assert_eq!(user.id(), Some(&Value::Integer(1)));
/// # Ok::<(), OrmError>(())
/// ```
pub struct Database {
    connector: Box<dyn Connector>,
    registry: Registry,
    config: Config,
}

impl Database {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self::with_config(connector, Config::default())
    }

    pub fn with_config(connector: impl Connector + 'static, config: Config) -> Self {
        Self {
            connector: Box::new(connector),
            registry: Registry::new(),
            config,
        }
    }

    /// Builds and registers a schema under its entity name.
    pub fn register(&mut self, builder: EntitySchemaBuilder) -> Result<Arc<EntitySchema>> {
        let schema = builder.build_with(&self.config)?;
        log::debug!(
            "Registered entity {} (table {}, {} fields)",
            schema.name(),
            schema.table(),
            schema.fields().len()
        );
        Ok(self.registry.register(schema))
    }

    pub fn register_model<M: Model>(&mut self) -> Result<Arc<EntitySchema>> {
        self.register(M::define(EntitySchemaBuilder::new(M::NAME)))
    }

    /// Handle on a registered entity type.
    pub fn model(&self, name: &str) -> Result<ModelRef<'_>> {
        Ok(ModelRef::new(self, self.registry.get(name)?))
    }

    pub fn model_of<M: Model>(&self) -> Result<ModelRef<'_>> {
        self.model(M::NAME)
    }

    pub fn schema(&self, name: &str) -> Result<Arc<EntitySchema>> {
        self.registry.get(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    pub fn executor(&self) -> Executor<'_> {
        Executor::new(self.connector.as_ref()).log_statements(self.config.log_statements)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("entities", &self.registry.names().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockConnector;
    use crate::core::OrmError;
    use crate::schema::FieldSpec;

    struct Post;

    impl Model for Post {
        const NAME: &'static str = "BlogPost";

        fn define(schema: EntitySchemaBuilder) -> EntitySchemaBuilder {
            schema
                .field("title", FieldSpec::varchar(120))
                .field("user_id", FieldSpec::unsigned_int())
                .belongs_to("User", Some("user_id"), Some("id"))
        }
    }

    #[test]
    fn test_register_model() {
        let mut db = Database::new(MockConnector::new());
        let schema = db.register_model::<Post>().unwrap();
        assert_eq!(schema.table(), "blog_post");
        assert_eq!(db.model_of::<Post>().unwrap().schema().name(), "BlogPost");
        assert!(db.registry().relation("User", "BlogPost").is_some());
    }

    #[test]
    fn test_config_applies_to_registration() {
        let config = Config::new().default_timestamps(false);
        let mut db = Database::with_config(MockConnector::new(), config);
        let schema = db.register(EntitySchemaBuilder::new("Tag")).unwrap();
        assert!(!schema.timestamps());
    }

    #[test]
    fn test_unknown_model() {
        let db = Database::new(MockConnector::new());
        assert!(matches!(db.model("Ghost"), Err(OrmError::UnknownEntityType(_))));
    }
}
