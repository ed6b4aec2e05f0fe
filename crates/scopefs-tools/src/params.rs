//! Typed access to a flat JSON parameter object.

use scopefs_vfs::{Encoding, Scope, ScopeSelector, WriteContent};
use serde_json::{Map, Value};

use crate::ToolError;

/// Parameters of one tool call.
///
/// A `null` value is treated the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    inner: Map<String, Value>,
}

impl Params {
    /// Wrap a JSON value. `null` becomes an empty parameter set.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if `value` is neither an object
    /// nor `null`.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(inner) => Ok(Self { inner }),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::invalid(
                "params",
                format!("expected an object, got {}", type_name(&other)),
            )),
        }
    }

    /// The raw parameter object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    /// Raw value for `key`, ignoring `null`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).filter(|v| !v.is_null())
    }

    /// Every key of `required` that is absent, in declaration order.
    #[must_use]
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.get(key).is_none())
            .map(|key| (*key).to_string())
            .collect()
    }

    /// A required string parameter.
    ///
    /// # Errors
    ///
    /// `MissingParameters` when absent, `InvalidParameter` when not a string.
    pub fn str(&self, key: &str) -> Result<&str, ToolError> {
        self.opt_str(key)?
            .ok_or_else(|| ToolError::MissingParameters(vec![key.to_string()]))
    }

    /// An optional string parameter.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when present but not a string.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(ToolError::invalid(
                key,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    /// An optional boolean parameter.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when present but not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ToolError::invalid(
                key,
                format!("expected a boolean, got {}", type_name(other)),
            )),
        }
    }

    /// The `scope` parameter, defaulting to `default`.
    ///
    /// # Errors
    ///
    /// `InvalidScope` for an unknown name (including `auto`).
    pub fn scope_or(&self, default: Scope) -> Result<Scope, ToolError> {
        match self.opt_str("scope")? {
            None => Ok(default),
            Some(name) => Ok(name.parse()?),
        }
    }

    /// The `scope` parameter for reads, where `auto` is allowed.
    ///
    /// # Errors
    ///
    /// `InvalidScope` for an unknown name.
    pub fn selector_or(&self, default: ScopeSelector) -> Result<ScopeSelector, ToolError> {
        match self.opt_str("scope")? {
            None => Ok(default),
            Some(name) => Ok(name.parse()?),
        }
    }

    /// The `encoding` parameter, defaulting to utf8.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an unsupported encoding.
    pub fn encoding(&self) -> Result<Encoding, ToolError> {
        match self.opt_str("encoding")? {
            None => Ok(Encoding::default()),
            Some(name) => name
                .parse()
                .map_err(|e: scopefs_vfs::VfsError| ToolError::invalid("encoding", e.to_string())),
        }
    }

    /// The `content` parameter. Strings are text; any other JSON value is
    /// written as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// `MissingParameters` when absent.
    pub fn content(&self) -> Result<WriteContent, ToolError> {
        self.get("content")
            .cloned()
            .map(WriteContent::from)
            .ok_or_else(|| ToolError::MissingParameters(vec!["content".to_string()]))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        Params::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value() {
        assert!(params(Value::Null).as_map().is_empty());
        assert!(matches!(
            Params::from_value(json!([1, 2])),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_missing_lists_every_key() {
        let p = params(json!({"content": "x", "path": null}));
        assert_eq!(p.missing(&["path", "content", "scope"]), vec!["path", "scope"]);
    }

    #[test]
    fn test_wrong_types() {
        let p = params(json!({"path": 3, "append": "yes"}));
        assert!(matches!(p.str("path"), Err(ToolError::InvalidParameter { .. })));
        assert!(matches!(
            p.bool_or("append", false),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_scope_defaults_and_errors() {
        let p = params(json!({}));
        assert_eq!(p.scope_or(Scope::Run).unwrap(), Scope::Run);
        assert_eq!(
            p.selector_or(ScopeSelector::Auto).unwrap(),
            ScopeSelector::Auto
        );

        let p = params(json!({"scope": "auto"}));
        assert!(matches!(
            p.scope_or(Scope::Run),
            Err(ToolError::Vfs(scopefs_vfs::VfsError::InvalidScope(_)))
        ));
        assert_eq!(
            p.selector_or(Scope::Run.into()).unwrap(),
            ScopeSelector::Auto
        );
    }

    #[test]
    fn test_encoding() {
        assert_eq!(params(json!({})).encoding().unwrap(), Encoding::Utf8);
        assert_eq!(
            params(json!({"encoding": "base64"})).encoding().unwrap(),
            Encoding::Base64
        );
        assert!(matches!(
            params(json!({"encoding": "ebcdic"})).encoding(),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_content_kinds() {
        let p = params(json!({"content": "hi"}));
        assert_eq!(p.content().unwrap(), WriteContent::Text("hi".into()));

        let p = params(json!({"content": {"a": 1}}));
        assert!(matches!(p.content().unwrap(), WriteContent::Structured(_)));
    }
}
