//! Field and column definitions.
//!
//! A [`ColumnDef`] describes one mapped column: its SQL type, optional length,
//! default, property flags, and the optional relation, validator and setter.
//! Runtime values are not stored here; they live in the owning record's
//! [`Values`](crate::table::Values).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use crate::relationship::Relation;
use crate::value::Value;

/// Bit-flag properties of a column.
///
/// Flags compose with `|`:
///
/// ```
/// use activerecord_core::ColumnProperty;
///
/// let props = ColumnProperty::NOT_NULL | ColumnProperty::UNIQUE;
/// assert!(props.contains(ColumnProperty::UNIQUE));
/// assert!(!props.contains(ColumnProperty::IMMUTABLE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ColumnProperty(u8);

impl ColumnProperty {
    pub const NONE: ColumnProperty = ColumnProperty(0);
    pub const UNIQUE: ColumnProperty = ColumnProperty(1);
    pub const NOT_NULL: ColumnProperty = ColumnProperty(2);
    pub const IMMUTABLE: ColumnProperty = ColumnProperty(4);
    pub const AUTO_INCREMENT: ColumnProperty = ColumnProperty(8);
    pub const PRIMARY_KEY: ColumnProperty = ColumnProperty(16);

    /// True if every flag in `other` is set.
    pub const fn contains(self, other: ColumnProperty) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ColumnProperty {
    type Output = ColumnProperty;

    fn bitor(self, rhs: ColumnProperty) -> ColumnProperty {
        ColumnProperty(self.0 | rhs.0)
    }
}

impl BitOrAssign for ColumnProperty {
    fn bitor_assign(&mut self, rhs: ColumnProperty) {
        self.0 |= rhs.0;
    }
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// A literal value.
    Value(Value),
    /// `CURRENT_TIMESTAMP`, resolved to the current UTC time on insert.
    CurrentTimestamp,
}

impl ColumnDefault {
    /// Render for a `DEFAULT` clause.
    pub fn to_sql(&self) -> String {
        match self {
            ColumnDefault::Value(v) => v.to_sql_literal(),
            ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        }
    }

    /// The value written into a record when filling defaults before insert.
    pub fn resolve(&self) -> Value {
        match self {
            ColumnDefault::Value(v) => v.clone(),
            ColumnDefault::CurrentTimestamp => Value::Text(current_timestamp()),
        }
    }
}

impl From<Value> for ColumnDefault {
    fn from(v: Value) -> Self {
        ColumnDefault::Value(v)
    }
}

/// Current UTC time in the `DATETIME` text format.
pub fn current_timestamp() -> String {
    chrono::Utc::now().format(DATETIME_FORMAT).to_string()
}

/// Text format of `DATETIME` values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Referential action for foreign key constraints (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    /// No action - raise error if any references exist.
    #[default]
    NoAction,
    /// Restrict - same as NO ACTION.
    Restrict,
    /// Cascade - automatically delete referencing rows.
    Cascade,
    /// Set null - set referencing columns to NULL.
    SetNull,
}

impl ReferentialAction {
    /// Get the SQL representation of this action.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
        }
    }

    /// The ON DELETE action implied by a relation column's nullability.
    pub const fn for_properties(properties: ColumnProperty) -> Self {
        if properties.contains(ColumnProperty::NOT_NULL) {
            ReferentialAction::Cascade
        } else {
            ReferentialAction::SetNull
        }
    }
}

/// Pure value check: `Ok(())` or a message describing the failure.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Transforms external input before it is stored (e.g. password hashing).
pub type Setter = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Definition of one mapped column.
#[derive(Clone)]
pub struct ColumnDef {
    /// Column name, unique within its table.
    pub name: String,
    /// SQL type; `None` for relation columns (inferred) or until set.
    pub sql_type: Option<String>,
    /// Length modifier, required for `VARCHAR`.
    pub length: Option<u32>,
    pub default: Option<ColumnDefault>,
    pub properties: ColumnProperty,
    /// Referenced record type for foreign-key columns.
    pub relation: Option<Relation>,
    pub validate: Option<Validator>,
    pub setter: Option<Setter>,
}

impl ColumnDef {
    /// Create an untyped, nullable column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: None,
            length: None,
            default: None,
            properties: ColumnProperty::NONE,
            relation: None,
            validate: None,
            setter: None,
        }
    }

    /// Set the SQL type (e.g. `"VARCHAR"`, `"INT"`, `"DATETIME"`).
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Literal default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    /// `DEFAULT CURRENT_TIMESTAMP`.
    pub fn default_current_timestamp(mut self) -> Self {
        self.default = Some(ColumnDefault::CurrentTimestamp);
        self
    }

    /// Add property flags (accumulates).
    pub fn properties(mut self, properties: ColumnProperty) -> Self {
        self.properties |= properties;
        self
    }

    pub fn not_null(self) -> Self {
        self.properties(ColumnProperty::NOT_NULL)
    }

    pub fn unique(self) -> Self {
        self.properties(ColumnProperty::UNIQUE)
    }

    pub fn immutable(self) -> Self {
        self.properties(ColumnProperty::IMMUTABLE)
    }

    /// Make this a foreign key to another record type.
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(f));
        self
    }

    pub fn has_property(&self, property: ColumnProperty) -> bool {
        self.properties.contains(property)
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }

    /// NOT NULL, no default and not auto-increment: input must supply a value.
    pub fn is_required(&self) -> bool {
        self.has_property(ColumnProperty::NOT_NULL)
            && self.default.is_none()
            && !self.has_property(ColumnProperty::AUTO_INCREMENT)
    }

    /// Declared type, or the inferred `INT UNSIGNED` for relation columns.
    pub fn effective_type(&self) -> Option<&str> {
        match (&self.sql_type, &self.relation) {
            (Some(t), _) => Some(t.as_str()),
            (None, Some(_)) => Some(RELATION_TYPE),
            (None, None) => None,
        }
    }

    /// Run the validator, if any.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match &self.validate {
            Some(validate) => validate(value),
            None => Ok(()),
        }
    }
}

/// SQL type inferred for relation (foreign key) columns.
pub const RELATION_TYPE: &str = "INT UNSIGNED";

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("sql_type", &self.sql_type)
            .field("length", &self.length)
            .field("default", &self.default)
            .field("properties", &self.properties)
            .field("relation", &self.relation)
            .field("validate", &self.validate.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}
