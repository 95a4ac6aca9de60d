//! Static metadata describing REST operations.
//!
//! An [EndpointDescriptor] records everything the dispatcher needs to turn a
//! bag of call parameters into a request: the verb, the path template and the
//! mappings from caller-facing parameter names to the names used on the wire.
//! Descriptors are grouped into an [EndpointTable], normally produced from an
//! OpenAPI document by the generator.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::naming::camel_case;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("endpoint '{endpoint}': required path parameter '{parameter}' has no placeholder in '{path}'")]
    MissingPlaceholder {
        endpoint: String,
        parameter: String,
        path: String,
    },
    #[error("endpoint '{endpoint}': {location} parameter '{parameter}' is mapped more than once")]
    DuplicateMapping {
        endpoint: String,
        location: &'static str,
        parameter: String,
    },
    #[error("endpoint '{0}' is defined more than once")]
    DuplicateEndpoint(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TableLoadError {
    #[error("endpoint table is not valid JSON")]
    Parse(#[source] serde_json::Error),
    #[error("endpoint table violates descriptor invariants")]
    Invalid(#[source] DescriptorError),
}

/// HTTP verbs the client dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpVerb {
    pub fn as_method(&self) -> http::Method {
        match self {
            HttpVerb::Get => http::Method::GET,
            HttpVerb::Post => http::Method::POST,
            HttpVerb::Put => http::Method::PUT,
            HttpVerb::Patch => http::Method::PATCH,
            HttpVerb::Delete => http::Method::DELETE,
            HttpVerb::Head => http::Method::HEAD,
            HttpVerb::Options => http::Method::OPTIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
        }
    }
}

impl TryFrom<&http::Method> for HttpVerb {
    type Error = http::Method;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        let verb = match *method {
            http::Method::GET => HttpVerb::Get,
            http::Method::POST => HttpVerb::Post,
            http::Method::PUT => HttpVerb::Put,
            http::Method::PATCH => HttpVerb::Patch,
            http::Method::DELETE => HttpVerb::Delete,
            http::Method::HEAD => HttpVerb::Head,
            http::Method::OPTIONS => HttpVerb::Options,
            _ => return Err(method.clone()),
        };
        Ok(verb)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps the name a caller uses for a parameter to the name sent on the wire
/// (a path placeholder, query key, header name or form field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMapping {
    pub external: String,
    pub internal: String,
    #[serde(default)]
    pub required: bool,
}

impl ParamMapping {
    pub fn new(external: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            external: external.into(),
            internal: internal.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub name: String,
    pub method: HttpVerb,
    /// Path template, `{name}` placeholders refer to [ParamMapping::internal]
    /// entries of `path_params`.
    pub path: String,
    #[serde(default)]
    pub path_params: Vec<ParamMapping>,
    #[serde(default)]
    pub query_params: Vec<ParamMapping>,
    #[serde(default)]
    pub header_params: Vec<ParamMapping>,
    #[serde(default)]
    pub form_params: Vec<ParamMapping>,
    #[serde(default)]
    pub has_body: bool,
    #[serde(default)]
    pub body_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl EndpointDescriptor {
    /// Creates a descriptor whose path parameters are derived from the
    /// placeholders of `path`. Each placeholder becomes a required parameter
    /// addressed by the camel case form of its name.
    pub fn new(name: impl Into<String>, method: HttpVerb, path: impl Into<String>) -> Self {
        let path = path.into();
        let path_params = placeholders(&path)
            .into_iter()
            .map(|p| ParamMapping::new(camel_case(p), p).required())
            .collect();
        Self {
            name: name.into(),
            method,
            path,
            path_params,
            query_params: Vec::new(),
            header_params: Vec::new(),
            form_params: Vec::new(),
            has_body: false,
            body_required: false,
            summary: None,
        }
    }

    pub fn query(mut self, external: &str, internal: &str) -> Self {
        self.query_params.push(ParamMapping::new(external, internal));
        self
    }

    pub fn required_query(mut self, external: &str, internal: &str) -> Self {
        self.query_params
            .push(ParamMapping::new(external, internal).required());
        self
    }

    pub fn header(mut self, external: &str, header_name: &str, required: bool) -> Self {
        let mut m = ParamMapping::new(external, header_name);
        m.required = required;
        self.header_params.push(m);
        self
    }

    pub fn form(mut self, external: &str, field: &str, required: bool) -> Self {
        let mut m = ParamMapping::new(external, field);
        m.required = required;
        self.form_params.push(m);
        self
    }

    pub fn body(mut self, required: bool) -> Self {
        self.has_body = true;
        self.body_required = required;
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Replaces the path parameter mappings, e.g. when the document declares
    /// optional path parameters or names that differ from the placeholders.
    pub fn with_path_params(mut self, path_params: Vec<ParamMapping>) -> Self {
        self.path_params = path_params;
        self
    }

    /// Names of all `{...}` placeholders in the path template, in order.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders(&self.path)
    }

    /// Checks the descriptor invariants: every required path parameter has a
    /// placeholder and no parameter is mapped twice within one location.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let placeholders = self.placeholders();
        for p in self.path_params.iter().filter(|p| p.required) {
            if !placeholders.contains(&p.internal.as_str()) {
                return Err(DescriptorError::MissingPlaceholder {
                    endpoint: self.name.clone(),
                    parameter: p.internal.clone(),
                    path: self.path.clone(),
                });
            }
        }

        let groups: [(&'static str, &Vec<ParamMapping>); 4] = [
            ("path", &self.path_params),
            ("query", &self.query_params),
            ("header", &self.header_params),
            ("form", &self.form_params),
        ];
        for (location, mappings) in groups {
            let mut external = HashSet::new();
            let mut internal = HashSet::new();
            for m in mappings {
                if !external.insert(m.external.as_str()) {
                    return Err(DescriptorError::DuplicateMapping {
                        endpoint: self.name.clone(),
                        location,
                        parameter: m.external.clone(),
                    });
                }
                if !internal.insert(m.internal.as_str()) {
                    return Err(DescriptorError::DuplicateMapping {
                        endpoint: self.name.clone(),
                        location,
                        parameter: m.internal.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn placeholders(path: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Ordered collection of descriptors, keyed by operation name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable {
    endpoints: IndexMap<String, EndpointDescriptor>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor after validating it.
    pub fn insert(&mut self, endpoint: EndpointDescriptor) -> Result<(), DescriptorError> {
        endpoint.validate()?;
        if self.endpoints.contains_key(&endpoint.name) {
            return Err(DescriptorError::DuplicateEndpoint(endpoint.name));
        }
        self.endpoints.insert(endpoint.name.clone(), endpoint);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Validates every descriptor, e.g. after loading a table from JSON.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.endpoints.values().try_for_each(|e| e.validate())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> Result<Self, TableLoadError> {
        let table: EndpointTable = serde_json::from_str(s).map_err(TableLoadError::Parse)?;
        table.validate().map_err(TableLoadError::Invalid)?;
        Ok(table)
    }
}

impl FromIterator<EndpointDescriptor> for EndpointTable {
    /// Collects descriptors without validation; later duplicates replace
    /// earlier ones. Use [EndpointTable::insert] to enforce the invariants.
    fn from_iter<I: IntoIterator<Item = EndpointDescriptor>>(iter: I) -> Self {
        Self {
            endpoints: iter.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_placeholders_become_required_path_params() {
        let e = EndpointDescriptor::new(
            "project_members_read",
            HttpVerb::Get,
            "/api/project/{project_id}/members/{id}/",
        );
        assert_eq!(e.placeholders(), vec!["project_id", "id"]);
        assert_eq!(
            e.path_params,
            vec![
                ParamMapping::new("projectId", "project_id").required(),
                ParamMapping::new("id", "id").required(),
            ]
        );
        e.validate().unwrap();
    }

    #[test]
    fn test_required_path_param_without_placeholder() {
        let e = EndpointDescriptor::new("task_read", HttpVerb::Get, "/api/task/task/")
            .with_path_params(vec![ParamMapping::new("id", "id").required()]);
        assert_eq!(
            e.validate(),
            Err(DescriptorError::MissingPlaceholder {
                endpoint: "task_read".to_string(),
                parameter: "id".to_string(),
                path: "/api/task/task/".to_string(),
            })
        );
    }

    #[test]
    fn test_query_param_mapped_twice() {
        let e = EndpointDescriptor::new("task_list", HttpVerb::Get, "/api/task/task/")
            .query("page", "page")
            .query("pageNo", "page");
        match e.validate() {
            Err(DescriptorError::DuplicateMapping {
                location, parameter, ..
            }) => {
                assert_eq!(location, "query");
                assert_eq!(parameter, "page");
            }
            other => panic!("expected DuplicateMapping, got {other:?}"),
        }
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let mut table = EndpointTable::new();
        table
            .insert(EndpointDescriptor::new("message_list", HttpVerb::Get, "/api/message/message/"))
            .unwrap();
        let err = table
            .insert(EndpointDescriptor::new("message_list", HttpVerb::Get, "/api/message/"))
            .unwrap_err();
        assert_eq!(err, DescriptorError::DuplicateEndpoint("message_list".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_json() {
        let mut table = EndpointTable::new();
        table
            .insert(
                EndpointDescriptor::new("category_read", HttpVerb::Get, "/api/project/category/{id}/")
                    .query("categoryType", "category_type"),
            )
            .unwrap();
        let json = table.to_json().unwrap();
        assert!(json.contains("\"method\": \"GET\""));
        let loaded = EndpointTable::from_json(&json).unwrap();
        assert_eq!(loaded, table);

        let broken = r#"{"x": {"name": "x", "method": "GET", "path": "/a/",
            "path_params": [{"external": "id", "internal": "id", "required": true}]}}"#;
        match EndpointTable::from_json(broken) {
            Err(TableLoadError::Invalid(_)) => (),
            other => panic!("expected invalid table, got {other:?}"),
        }
    }
}
