use log::debug;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{Result, SchemaError};

use super::record::Record;
use super::types::ValueKind;
use super::value::Value;

pub type MutHook = Arc<dyn Fn(&mut Record) -> Result<()> + Send + Sync>;
pub type CheckHook = Arc<dyn Fn(&Record) -> Result<()> + Send + Sync>;

/// Lifecycle callbacks run before a record is persisted.
///
/// Every slot defaults to a no-op. Any hook may reject the record by
/// returning an error, which is handed back to the caller as-is.
#[derive(Clone, Default)]
pub struct RecordHooks {
    prepare: Option<MutHook>,
    validate: Option<CheckHook>,
    before_save: Option<MutHook>,
}

impl RecordHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_prepare<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(hook));
        self
    }

    pub fn on_validate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Record) -> Result<()> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(hook));
        self
    }

    pub fn on_before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    {
        self.before_save = Some(Arc::new(hook));
        self
    }

    pub fn prepare(&self, record: &mut Record) -> Result<()> {
        match &self.prepare {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }

    pub fn validate(&self, record: &Record) -> Result<()> {
        match &self.validate {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }

    pub fn before_save(&self, record: &mut Record) -> Result<()> {
        match &self.before_save {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }

    /// Runs `prepare`, `validate` and `before_save` in order, stopping at the
    /// first error.
    pub fn run_before_save(&self, record: &mut Record) -> Result<()> {
        debug!("running lifecycle hooks for {}", record.descriptor().name());
        self.prepare(record)?;
        self.validate(record)?;
        self.before_save(record)
    }
}

impl fmt::Debug for RecordHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordHooks")
            .field("prepare", &self.prepare.is_some())
            .field("validate", &self.validate.is_some())
            .field("before_save", &self.before_save.is_some())
            .finish()
    }
}

/// Prepare hook: fills absent text primary-key columns with a v4 UUID.
pub fn assign_uuid(record: &mut Record) -> Result<()> {
    let targets: Vec<String> = record
        .primary_key()
        .into_iter()
        .filter(|(column, value)| {
            column.kind == ValueKind::Text && !column.is_array && value.is_absent()
        })
        .map(|(column, _)| column.name.clone())
        .collect();

    for column in targets {
        record.set(&column, Value::Text(Uuid::new_v4().to_string()))?;
    }
    Ok(())
}

/// Validate hook: rejects records whose values do not fit the descriptor.
pub fn require_shape(record: &Record) -> Result<()> {
    record.check_shape()
}

/// Validate hook factory: rejects records where `column` is absent, even if
/// the column itself is nullable.
pub fn require_present(column: &'static str) -> impl Fn(&Record) -> Result<()> + Send + Sync {
    move |record: &Record| {
        if record.get(column)?.is_present() {
            Ok(())
        } else {
            Err(SchemaError::Validation(format!(
                "{}.{} must be set",
                record.descriptor().name(),
                column
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{ColumnDefinition, JsonStyle, TableDefinition, TableDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_session() -> Record {
        let def = TableDefinition::new("user_session")
            .column(ColumnDefinition::new("ID", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("USER_ID", "VARCHAR(255)"))
            .column(ColumnDefinition::new("REALM_ID", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("STARTED", "INT"));
        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();
        Record::new(Arc::new(table))
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let hooks = RecordHooks::new();
        let mut record = user_session();
        let before = record.clone();
        hooks.run_before_save(&mut record).unwrap();
        assert_eq!(record, before);
    }

    #[test]
    fn test_hooks_run_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c1, c2, c3) = (calls.clone(), calls.clone(), calls.clone());

        let hooks = RecordHooks::new()
            .on_prepare(move |_| {
                assert_eq!(c1.fetch_add(1, Ordering::SeqCst), 0);
                Ok(())
            })
            .on_validate(move |_| {
                assert_eq!(c2.fetch_add(1, Ordering::SeqCst), 1);
                Ok(())
            })
            .on_before_save(move |_| {
                assert_eq!(c3.fetch_add(1, Ordering::SeqCst), 2);
                Ok(())
            });

        hooks.run_before_save(&mut user_session()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_hook_error_is_returned_unmodified() {
        let saved = Arc::new(AtomicUsize::new(0));
        let saved_in_hook = saved.clone();
        let hooks = RecordHooks::new()
            .on_validate(|_| Err(SchemaError::Validation("realm is read-only".to_string())))
            .on_before_save(move |_| {
                saved_in_hook.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let err = hooks.run_before_save(&mut user_session()).unwrap_err();
        assert!(matches!(err, SchemaError::Validation(msg) if msg == "realm is read-only"));
        assert_eq!(saved.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_assign_uuid_fills_absent_keys_only() {
        let mut record = user_session();
        assign_uuid(&mut record).unwrap();
        let id = record.get("id").unwrap().value().cloned();
        match id {
            Some(Value::Text(id)) => assert!(Uuid::parse_str(&id).is_ok()),
            other => panic!("unexpected id {:?}", other),
        }

        let mut record = user_session();
        record.set("id", "fixed").unwrap();
        assign_uuid(&mut record).unwrap();
        assert_eq!(record.get("id").unwrap().value(), Some(&Value::from("fixed")));
    }

    #[test]
    fn test_stock_validators() {
        let hooks = RecordHooks::new()
            .on_prepare(assign_uuid)
            .on_validate(require_shape);

        let mut record = user_session();
        assert!(hooks.run_before_save(&mut record).is_err());

        record.set("realm_id", "master").unwrap();
        assert!(hooks.run_before_save(&mut record).is_ok());

        let check = require_present("user_id");
        assert!(check(&record).is_err());
        record.set("user_id", "u-1").unwrap();
        assert!(check(&record).is_ok());
    }
}
