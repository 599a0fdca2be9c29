use kcschema::db::file::{CatalogDocument, FileSource};
use kcschema::db::load_registry;
use kcschema::models::hooks::{assign_uuid, require_shape};
use kcschema::{
    field_name_for, primary_key_columns, ColumnDefinition, JsonStyle, Record, RecordHooks,
    SchemaError, SchemaRegistry, TableDefinition, Value,
};
use serde_json::json;

fn widget_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            TableDefinition::new("widget")
                .column(ColumnDefinition::new("id", "VARCHAR(36)").primary_key())
                .column(ColumnDefinition::new("label", "VARCHAR(255)")),
        )
        .unwrap();
    registry
}

#[test]
fn test_widget_example() {
    let registry = widget_registry();
    let widget = registry.describe("widget").unwrap();

    let ordinals: Vec<usize> = widget.columns().iter().map(|c| c.index).collect();
    assert_eq!(ordinals, vec![0, 1]);

    let pk: Vec<&str> = primary_key_columns(&widget)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(pk, vec!["id"]);

    let label = widget.column("label").unwrap();
    assert_eq!(field_name_for(label, "json").unwrap(), "label");

    assert!(matches!(
        registry.describe("nonexistent_table"),
        Err(SchemaError::NotFound(_))
    ));
}

#[test]
fn test_builtin_ordinals_are_contiguous() {
    let registry = SchemaRegistry::keycloak().unwrap();
    assert!(!registry.is_empty());

    for table in registry.tables() {
        assert!(!table.columns().is_empty(), "{}", table.name());
        for (expected, column) in table.columns().iter().enumerate() {
            assert_eq!(column.index, expected, "{}.{}", table.name(), column.name);
            assert_eq!(column.proto_number as usize, expected + 1);
        }
    }
}

#[test]
fn test_primary_key_columns_are_deterministic() {
    let registry = SchemaRegistry::keycloak().unwrap();

    for table in registry.tables() {
        let first = primary_key_columns(table);
        let second = primary_key_columns(table);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].index < w[1].index));
    }

    let offline = registry.describe("offline_client_session").unwrap();
    let names: Vec<&str> = offline
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "USER_SESSION_ID",
            "CLIENT_ID",
            "OFFLINE_FLAG",
            "CLIENT_STORAGE_PROVIDER",
            "EXTERNAL_CLIENT_ID"
        ]
    );
}

#[test]
fn test_field_names_follow_style() {
    let registry = SchemaRegistry::keycloak_with_style(JsonStyle::LowerCamel).unwrap();
    let user = registry.describe("USER_ENTITY").unwrap();
    let created = user.column("created_timestamp").unwrap();

    assert_eq!(field_name_for(created, "json").unwrap(), "createdTimestamp");
    assert_eq!(field_name_for(created, "native").unwrap(), "created_timestamp");
    assert_eq!(field_name_for(created, "protobuf").unwrap(), "created_timestamp");
    assert!(matches!(
        field_name_for(created, "yaml"),
        Err(SchemaError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_user_session_lifecycle() {
    let mut registry = SchemaRegistry::keycloak().unwrap();
    registry
        .set_hooks(
            "user_session",
            RecordHooks::new()
                .on_prepare(assign_uuid)
                .on_validate(require_shape)
                .on_before_save(|record| {
                    if record.get("started")?.is_absent() {
                        record.set("started", 1_700_000_000i32)?;
                    }
                    Ok(())
                }),
        )
        .unwrap();

    let mut session = registry.new_record("user_session").unwrap();
    session.set("realm_id", "master").unwrap();
    session.set("user_id", "u-1").unwrap();
    session.set("remember_me", false).unwrap();
    registry.before_save(&mut session).unwrap();

    assert!(session.get("id").unwrap().is_present());
    assert_eq!(
        session.get("started").unwrap().value(),
        Some(&Value::Integer(1_700_000_000))
    );

    let json = session.to_json().unwrap();
    assert_eq!(json["realm_id"], json!("master"));
    assert_eq!(json["ip_address"], serde_json::Value::Null);

    let parsed = Record::from_json(registry.describe("user_session").unwrap(), &json).unwrap();
    assert_eq!(parsed, session);
}

#[test]
fn test_validation_error_passes_through() {
    let mut registry = SchemaRegistry::keycloak().unwrap();
    registry
        .set_hooks(
            "credential",
            RecordHooks::new().on_validate(|_| {
                Err(SchemaError::Validation("credentials are managed elsewhere".into()))
            }),
        )
        .unwrap();

    let mut credential = registry.new_record("credential").unwrap();
    let err = registry.before_save(&mut credential).unwrap_err();
    assert!(matches!(err, SchemaError::Validation(msg) if msg == "credentials are managed elsewhere"));
}

#[tokio::test]
async fn test_registry_from_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    CatalogDocument {
        tables: vec![TableDefinition::new("widget")
            .column(ColumnDefinition::new("id", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("label", "VARCHAR(255)"))],
    }
    .write(&path)
    .await
    .unwrap();

    let registry = load_registry(&FileSource::new(&path), JsonStyle::Snake)
        .await
        .unwrap();
    let widget = registry.describe("widget").unwrap();
    assert_eq!(widget, widget_registry().describe("widget").unwrap());
}
