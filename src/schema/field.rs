use crate::core::Value;
use serde::Serialize;

/// Default assigned to a field when an entity is constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Value(Value),
    /// Resolved to "now" (epoch seconds) at construction time.
    CurrentTimestamp,
}

/// Declarative metadata for one column.
///
/// Every attribute is optional at declaration time; unset attributes resolve
/// against the default template (`VARCHAR(255)`, nullable, no key, no index,
/// `NULL` default). [`FieldSpec::normalize`] materializes that merge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSpec {
    pub type_tag: Option<String>,
    pub allow_null: Option<bool>,
    pub primary_key: Option<bool>,
    pub auto_increment: Option<bool>,
    pub index: Option<bool>,
    pub unique: Option<bool>,
    pub default_value: Option<DefaultValue>,
    pub comment: Option<String>,
    pub values: Option<Vec<String>>,
    pub on_duplicate: Option<String>,
}

const DEFAULT_TYPE: &str = "VARCHAR(255)";

impl FieldSpec {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: Some(type_tag.into()),
            ..Self::default()
        }
    }

    pub fn varchar(len: u32) -> Self {
        Self::new(format!("VARCHAR({})", len))
    }

    pub fn int() -> Self {
        Self::new("INT")
    }

    pub fn unsigned_int() -> Self {
        Self::new("UNSIGNED INT")
    }

    pub fn boolean() -> Self {
        Self::new("BOOLEAN")
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::new(format!("DECIMAL({},{})", precision, scale))
    }

    pub fn text() -> Self {
        Self::new("TEXT")
    }

    pub fn timestamp() -> Self {
        Self::new("TIMESTAMP")
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::new("ENUM")
        }
    }

    /// The built-in identifier column every schema starts from.
    pub fn identifier() -> Self {
        Self::unsigned_int().not_null().primary_key().auto_increment()
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = Some(false);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = Some(true);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = Some(true);
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    pub fn index(mut self) -> Self {
        self.index = Some(true);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(match value.into() {
            Value::Null => DefaultValue::Null,
            v => DefaultValue::Value(v),
        });
        self
    }

    pub fn default_current_timestamp(mut self) -> Self {
        self.default_value = Some(DefaultValue::CurrentTimestamp);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Expression written for this column when an insert hits a duplicate key.
    pub fn on_duplicate(mut self, expression: impl Into<String>) -> Self {
        self.on_duplicate = Some(expression.into());
        self
    }

    /// Merges this declaration over the default template.
    ///
    /// Only unset attributes are filled, so normalizing an already
    /// normalized spec returns it unchanged.
    pub fn normalize(&self) -> Self {
        Self {
            type_tag: Some(self.type_tag().to_string()),
            allow_null: Some(self.allows_null()),
            primary_key: Some(self.is_primary_key()),
            auto_increment: Some(self.is_auto_increment()),
            index: Some(self.is_indexed()),
            unique: Some(self.is_unique()),
            default_value: Some(self.resolved_default().clone()),
            comment: self.comment.clone(),
            values: self.values.clone(),
            on_duplicate: self.on_duplicate.clone(),
        }
    }

    pub fn type_tag(&self) -> &str {
        self.type_tag.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    pub fn allows_null(&self) -> bool {
        self.allow_null.unwrap_or(true)
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key.unwrap_or(false)
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment.unwrap_or(false)
    }

    pub fn is_indexed(&self) -> bool {
        self.index.unwrap_or(false)
    }

    pub fn is_unique(&self) -> bool {
        self.unique.unwrap_or(false)
    }

    pub fn resolved_default(&self) -> &DefaultValue {
        self.default_value.as_ref().unwrap_or(&DefaultValue::Null)
    }

    pub fn is_enum(&self) -> bool {
        self.type_tag().to_ascii_uppercase().starts_with("ENUM")
    }

    /// Public-facing projection: no nullability, keys, indexes or defaults.
    pub fn meta(&self) -> FieldMeta {
        let is_enum = self.is_enum();
        FieldMeta {
            type_tag: self.type_tag().to_ascii_uppercase(),
            primary_key: self.is_primary_key(),
            comment: self.comment.clone(),
            values: if is_enum { self.values.clone() } else { None },
        }
    }
}

/// Schema description safe to hand to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub primary_key: bool,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}
