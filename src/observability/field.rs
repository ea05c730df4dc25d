//! Key/value pairs attached to log records.

use std::borrow::Cow;
use std::fmt;

/// A structured log field.
///
/// The value is rendered through `Display` when the field is built, so a
/// field never changes after construction and can be shared freely between
/// threads. Duplicate keys are allowed and are rendered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    key: Cow<'static, str>,
    value: String,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl fmt::Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Field
where
    K: Into<Cow<'static, str>>,
    V: fmt::Display,
{
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

impl From<&Field> for Field {
    fn from(field: &Field) -> Self {
        field.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_key_equals_value() {
        assert_eq!(Field::new("a", 1).to_string(), "a=1");
        assert_eq!(Field::new("b", "x").to_string(), "b=x");
        assert_eq!(Field::new(String::from("owned"), 2.5).to_string(), "owned=2.5");
    }

    #[test]
    fn from_tuple() {
        let field: Field = ("page_id", 42).into();
        assert_eq!(field.key(), "page_id");
        assert_eq!(field.value(), "42");
    }
}
