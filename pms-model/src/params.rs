use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Name of the parameter carrying the JSON request body.
pub const BODY_PARAM: &str = "data";

/// Parameters of a single call, keyed by their caller-facing names.
///
/// Besides the named parameters, a call may carry an extra query bag whose
/// entries are appended to the query string under their own names, without
/// going through the endpoint's query mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallParameters {
    values: IndexMap<String, Value>,
    extra_query: IndexMap<String, Value>,
}

impl CallParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [CallParameters::set].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the `data` parameter from anything serializable.
    pub fn with_data(mut self, data: &impl Serialize) -> serde_json::Result<Self> {
        self.values
            .insert(BODY_PARAM.to_string(), serde_json::to_value(data)?);
        Ok(self)
    }

    pub fn with_extra_query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_query.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Returns the value of `name`. A JSON `null` counts as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Wire form of a parameter, see [value_to_param_string].
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(value_to_param_string)
    }

    pub fn extra_query(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra_query
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CallParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = CallParameters::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Renders a parameter value the way it is placed into paths, query strings,
/// headers and form fields: strings verbatim, numbers and booleans in their
/// JSON notation, arrays as comma separated items and objects as JSON text.
pub fn value_to_param_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_param_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}
