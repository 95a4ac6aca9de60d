use std::{io, str::FromStr};

/// An API description document, reduced to what endpoint generation needs.
pub trait Spec: FromStr<Err = anyhow::Error> + Sized {
    fn from_reader(r: impl io::Read) -> anyhow::Result<Self>;

    fn title(&self) -> &str;

    /// All operations of the document, in document order.
    fn operations(&self) -> anyhow::Result<Vec<OperationDef>>;
}

/// Where a parameter travels. `Body` and `FormData` only occur in Swagger 2.0
/// documents; OpenAPI 3.0 request bodies are reported via
/// [OperationDef::request_body].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, location: ParameterLocation, required: bool) -> Self {
        Self {
            name: name.into(),
            location,
            required,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    /// Form fields; their names are listed as [ParameterLocation::FormData]
    /// parameters.
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBodyDef {
    pub kind: BodyKind,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDef {
    pub path: String,
    pub method: http::Method,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// parameters declared on the path item, shared by all its operations
    pub path_item_parameters: Vec<ParameterDef>,
    pub parameters: Vec<ParameterDef>,
    pub request_body: Option<RequestBodyDef>,
}

impl OperationDef {
    /// Path item parameters merged with operation parameters. An operation
    /// parameter overrides a path item parameter with the same name and
    /// location.
    pub fn merged_parameters(&self) -> Vec<ParameterDef> {
        let mut merged: Vec<ParameterDef> = self
            .path_item_parameters
            .iter()
            .filter(|p| {
                !self
                    .parameters
                    .iter()
                    .any(|o| o.name == p.name && o.location == p.location)
            })
            .cloned()
            .collect();
        merged.extend(self.parameters.iter().cloned());
        merged
    }
}
