//! Creation and modification timestamps.

use chrono::NaiveDateTime;

use activerecord_core::{
    ColumnDef, DATETIME_FORMAT, Error, Result, Value, Values, current_timestamp,
};

use super::text_column;
use crate::model::{Bundle, Model, TableBuilder};
use crate::record::Record;

pub const CREATED: &str = "created";
pub const LAST_MODIFIED: &str = "last_modified";

/// Adds immutable `created` and `last_modified` DATETIME columns.
///
/// Both are stamped on create; `last_modified` is restamped on update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamps;

impl Bundle for Timestamps {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
        for name in [CREATED, LAST_MODIFIED] {
            t.column(
                ColumnDef::new(name)
                    .sql_type("DATETIME")
                    .not_null()
                    .immutable()
                    .default_current_timestamp(),
            )?;
        }
        t.on_create(CREATED, |v| stamp(v, CREATED))?
            .on_create(LAST_MODIFIED, |v| stamp(v, LAST_MODIFIED))?
            .on_update(LAST_MODIFIED, |v| stamp(v, LAST_MODIFIED))?;
        Ok(())
    }
}

fn stamp(values: &mut Values, column: &str) -> Result<()> {
    values.set(column, current_timestamp())
}

/// Accessors for records with the [`Timestamps`] bundle.
pub trait TimestampsExt {
    fn created_at(&self) -> Result<Option<NaiveDateTime>>;

    fn last_modified_at(&self) -> Result<Option<NaiveDateTime>>;
}

impl<M: Model> TimestampsExt for Record<M> {
    fn created_at(&self) -> Result<Option<NaiveDateTime>> {
        parse(self, CREATED)
    }

    fn last_modified_at(&self) -> Result<Option<NaiveDateTime>> {
        parse(self, LAST_MODIFIED)
    }
}

fn parse<M: Model>(record: &Record<M>, column: &str) -> Result<Option<NaiveDateTime>> {
    let Some(text) = text_column(record, column)? else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
        .map(Some)
        .map_err(|e| {
            Error::Custom(format!(
                "Column `{}` holds an invalid datetime {:?}: {}",
                column, text, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use activerecord_core::{ColumnDefault, ColumnProperty, Row};

    use crate::test_support::MockConnection;

    struct Event;

    impl Model for Event {
        const TABLE_NAME: &'static str = "events";

        fn define(t: &mut TableBuilder) -> Result<()> {
            t.column(ColumnDef::new("name").sql_type("TEXT"))?
                .bundle(&Timestamps)?;
            Ok(())
        }
    }

    #[test]
    fn test_columns_are_immutable_with_current_timestamp_default() {
        let (table, _) = Event::schema().unwrap();
        for name in [CREATED, LAST_MODIFIED] {
            let column = table.get(name).unwrap();
            assert!(column.has_property(ColumnProperty::NOT_NULL | ColumnProperty::IMMUTABLE));
            assert_eq!(column.default, Some(ColumnDefault::CurrentTimestamp));
        }
    }

    #[test]
    fn test_create_stamps_both_update_stamps_last_modified() {
        let conn = Arc::new(MockConnection::new());
        let mut event = Record::<Event>::new(conn).unwrap();
        event.create().unwrap();
        assert!(event.created_at().unwrap().is_some());
        assert!(event.last_modified_at().unwrap().is_some());

        event.set(LAST_MODIFIED, "2000-01-01 00:00:00").unwrap();
        event.set(CREATED, "2000-01-01 00:00:00").unwrap();
        event.update().unwrap();
        let created = event.created_at().unwrap().unwrap();
        let modified = event.last_modified_at().unwrap().unwrap();
        assert_eq!(created.format(DATETIME_FORMAT).to_string(), "2000-01-01 00:00:00");
        assert!(modified > created);
    }

    #[test]
    fn test_invalid_datetime_is_an_error() {
        let conn = Arc::new(MockConnection::new());
        let mut event = Record::<Event>::new(conn).unwrap();
        assert_eq!(event.created_at().unwrap(), None);
        event.fill(&Row::new().with(CREATED, "yesterday"));
        assert!(matches!(event.created_at(), Err(Error::Custom(_))));
        assert_eq!(event.get("name").unwrap(), Value::Null);
    }
}
