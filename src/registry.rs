use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::{Result, SchemaError};
use crate::models::hooks::RecordHooks;
use crate::models::keycloak::keycloak_tables;
use crate::models::proto::render_proto_file;
use crate::models::record::Record;
use crate::models::schema::{JsonStyle, TableDefinition, TableDescriptor};

/// The set of table descriptors known to the process.
///
/// Built once, then shared read-only (typically behind an `Arc`). Lookups are
/// case-insensitive on the table name.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, Arc<TableDescriptor>>,
    hooks: HashMap<String, RecordHooks>,
    json_style: JsonStyle,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_style(json_style: JsonStyle) -> Self {
        Self {
            json_style,
            ..Self::default()
        }
    }

    /// Registry over the built-in Keycloak catalog.
    pub fn keycloak() -> Result<Self> {
        Self::keycloak_with_style(JsonStyle::default())
    }

    pub fn keycloak_with_style(json_style: JsonStyle) -> Result<Self> {
        let mut registry = Self::with_json_style(json_style);
        registry.register_all(keycloak_tables())?;
        info!("loaded {} built-in Keycloak tables", registry.len());
        Ok(registry)
    }

    pub fn json_style(&self) -> JsonStyle {
        self.json_style
    }

    /// Builds and stores the descriptor for `definition`. Registering the
    /// same table name twice is an error.
    pub fn register(&mut self, definition: TableDefinition) -> Result<Arc<TableDescriptor>> {
        let key = table_key(&definition.name);
        if self.tables.contains_key(&key) {
            return Err(SchemaError::InvalidDefinition(format!(
                "table {} is already registered",
                definition.name
            )));
        }

        let descriptor = Arc::new(TableDescriptor::from_definition(
            &definition,
            self.json_style,
        )?);
        debug!("registered table {}", descriptor.name());
        self.tables.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn register_all<I>(&mut self, definitions: I) -> Result<()>
    where
        I: IntoIterator<Item = TableDefinition>,
    {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Descriptor for `table_name`, or `NotFound`.
    pub fn describe(&self, table_name: &str) -> Result<Arc<TableDescriptor>> {
        self.tables
            .get(&table_key(table_name))
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(table_name.to_string()))
    }

    pub fn contains(&self, table_name: &str) -> bool {
        self.tables.contains_key(&table_key(table_name))
    }

    /// Descriptors ordered by lower-cased table name.
    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableDescriptor>> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.values().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Installs lifecycle hooks for a registered table, replacing any
    /// previous set.
    pub fn set_hooks(&mut self, table_name: &str, hooks: RecordHooks) -> Result<()> {
        let key = table_key(table_name);
        if !self.tables.contains_key(&key) {
            return Err(SchemaError::NotFound(table_name.to_string()));
        }
        debug!("installed hooks for {}: {:?}", table_name, hooks);
        self.hooks.insert(key, hooks);
        Ok(())
    }

    /// Hooks for `table_name`; the no-op set when none were installed.
    pub fn hooks(&self, table_name: &str) -> Result<RecordHooks> {
        let key = table_key(table_name);
        if !self.tables.contains_key(&key) {
            return Err(SchemaError::NotFound(table_name.to_string()));
        }
        Ok(self.hooks.get(&key).cloned().unwrap_or_default())
    }

    /// An empty record for `table_name`.
    pub fn new_record(&self, table_name: &str) -> Result<Record> {
        Ok(Record::new(self.describe(table_name)?))
    }

    /// Runs the table's lifecycle hooks on `record` ahead of persistence.
    pub fn before_save(&self, record: &mut Record) -> Result<()> {
        let hooks = self.hooks(record.descriptor().name())?;
        hooks.run_before_save(record)
    }

    /// Renders every registered table into one `.proto` file.
    pub fn to_proto(&self, package: &str) -> String {
        render_proto_file(self.tables.values().map(|t| t.as_ref()), package)
    }
}

fn table_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hooks::assign_uuid;
    use crate::models::schema::ColumnDefinition;
    use crate::models::value::Value;

    fn widget() -> TableDefinition {
        TableDefinition::new("widget")
            .column(ColumnDefinition::new("id", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("label", "VARCHAR(255)"))
    }

    #[test]
    fn test_describe_registered_table() {
        let mut registry = SchemaRegistry::new();
        registry.register(widget()).unwrap();

        let table = registry.describe("widget").unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(registry.describe("WIDGET").unwrap(), table);
    }

    #[test]
    fn test_describe_unknown_table() {
        let registry = SchemaRegistry::new();
        let err = registry.describe("nonexistent_table").unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(name) if name == "nonexistent_table"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(widget()).unwrap();
        let err = registry.register(widget()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition(_)));
    }

    #[test]
    fn test_hooks_default_and_override() {
        let mut registry = SchemaRegistry::new();
        registry.register(widget()).unwrap();

        let mut record = registry.new_record("widget").unwrap();
        registry.before_save(&mut record).unwrap();
        assert!(record.get("id").unwrap().is_absent());

        registry
            .set_hooks("widget", RecordHooks::new().on_prepare(assign_uuid))
            .unwrap();
        registry.before_save(&mut record).unwrap();
        assert!(matches!(
            record.get("id").unwrap().value(),
            Some(Value::Text(id)) if id.len() == 36
        ));

        let err = registry.set_hooks("gadget", RecordHooks::new()).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(_)));
    }

    #[test]
    fn test_keycloak_registry() {
        let registry = SchemaRegistry::keycloak().unwrap();
        assert!(registry.len() > 20);

        let session = registry.describe("user_session").unwrap();
        let pk: Vec<&str> = session
            .primary_key_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(pk, vec!["ID"]);

        let names = registry.table_names();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_ascii_lowercase());
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_proto_export() {
        let registry = SchemaRegistry::keycloak().unwrap();
        let proto = registry.to_proto("keycloak");
        assert!(proto.contains("message UserSession {"));
        assert!(proto.contains("message ClientSession {"));
        assert!(proto.contains("import \"google/protobuf/timestamp.proto\";"));
    }
}
