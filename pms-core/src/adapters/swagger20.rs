//! Swagger 2.0 documents, as served by the PMS backend under
//! `/api/doc?format=openapi`.
//!
//! Only the parts relevant for endpoint generation are modelled; everything
//! else in the document is ignored while deserializing.

use std::io::BufReader;
use std::str::FromStr;

use anyhow::anyhow;
use http::Method;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{
    BodyKind, OperationDef, ParameterDef, ParameterLocation, RequestBodyDef, Spec,
};

const PARAMETERS_PREFIX: &str = "#/parameters/";

#[derive(Debug, Deserialize)]
struct SwaggerDoc {
    #[serde(default)]
    info: Info,
    #[serde(default, rename = "basePath")]
    base_path: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, PathItem>,
    #[serde(default)]
    parameters: IndexMap<String, Parameter>,
}

#[derive(Debug, Default, Deserialize)]
struct Info {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct PathItem {
    #[serde(default)]
    parameters: Vec<ParameterOrRef>,
    get: Option<Operation>,
    put: Option<Operation>,
    post: Option<Operation>,
    delete: Option<Operation>,
    options: Option<Operation>,
    head: Option<Operation>,
    patch: Option<Operation>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterOrRef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParameterOrRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(Parameter),
}

#[derive(Debug, Clone, Deserialize)]
struct Parameter {
    name: String,
    #[serde(rename = "in")]
    in_: String,
    #[serde(default)]
    required: bool,
}

pub struct Swagger20Spec {
    doc: SwaggerDoc,
}

impl FromStr for Swagger20Spec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        // YAML is a superset of JSON, so this reads both encodings
        let doc: SwaggerDoc = serde_yaml::from_str(s)?;
        Ok(Swagger20Spec { doc })
    }
}

fn location_of(in_: &str) -> anyhow::Result<ParameterLocation> {
    let location = match in_ {
        "query" => ParameterLocation::Query,
        "header" => ParameterLocation::Header,
        "path" => ParameterLocation::Path,
        "body" => ParameterLocation::Body,
        "formData" => ParameterLocation::FormData,
        other => return Err(anyhow!("unknown parameter location '{other}'")),
    };
    Ok(location)
}

impl Swagger20Spec {
    fn resolve<'a>(&'a self, p: &'a ParameterOrRef) -> anyhow::Result<&'a Parameter> {
        match p {
            ParameterOrRef::Item(param) => Ok(param),
            ParameterOrRef::Reference { reference } => {
                let name = reference.strip_prefix(PARAMETERS_PREFIX).ok_or_else(|| {
                    anyhow!("Only references to '{PARAMETERS_PREFIX}*' are supported, '{reference}' does not match")
                })?;
                self.doc
                    .parameters
                    .get(name)
                    .ok_or_else(|| anyhow!("expected reference {reference} not found in document"))
            }
        }
    }

    fn parameter_defs(&self, params: &[ParameterOrRef]) -> anyhow::Result<Vec<ParameterDef>> {
        params
            .iter()
            .map(|p| {
                let p = self.resolve(p)?;
                // path parameters are always required, even if the document forgets to say so
                let location = location_of(&p.in_)?;
                let required = p.required || location == ParameterLocation::Path;
                Ok(ParameterDef::new(&p.name, location, required))
            })
            .collect()
    }

    fn full_path(&self, path: &str) -> String {
        match self.doc.base_path.as_deref().map(|b| b.trim_end_matches('/')) {
            Some(base) if !base.is_empty() => format!("{base}{path}"),
            _ => path.to_string(),
        }
    }
}

/// The body an operation takes, derived from its effective `body` and
/// `formData` parameters. A `body` parameter wins over form fields.
fn request_body(parameters: &[ParameterDef]) -> Option<RequestBodyDef> {
    let mut request_body = None;
    for p in parameters {
        match p.location {
            ParameterLocation::Body => {
                request_body = Some(RequestBodyDef {
                    kind: BodyKind::Json,
                    required: p.required,
                })
            }
            ParameterLocation::FormData if request_body.is_none() => {
                request_body = Some(RequestBodyDef {
                    kind: BodyKind::Form,
                    required: false,
                })
            }
            _ => (),
        }
    }
    request_body
}

impl Spec for Swagger20Spec {
    fn from_reader(r: impl std::io::Read) -> anyhow::Result<Self> {
        let r = BufReader::new(r);
        let doc: SwaggerDoc = serde_yaml::from_reader(r)?;
        Ok(Swagger20Spec { doc })
    }

    fn title(&self) -> &str {
        &self.doc.info.title
    }

    fn operations(&self) -> anyhow::Result<Vec<OperationDef>> {
        let mut operations = Vec::new();
        for (path, item) in &self.doc.paths {
            let path_item_parameters = self.parameter_defs(&item.parameters)?;
            let ops = [
                (Method::GET, &item.get),
                (Method::PUT, &item.put),
                (Method::POST, &item.post),
                (Method::DELETE, &item.delete),
                (Method::OPTIONS, &item.options),
                (Method::HEAD, &item.head),
                (Method::PATCH, &item.patch),
            ];
            for (method, op) in ops {
                let Some(op) = op else { continue };
                let parameters = self.parameter_defs(&op.parameters)?;

                let mut operation = OperationDef {
                    path: self.full_path(path),
                    method,
                    operation_id: op.operation_id.clone(),
                    summary: op.summary.clone().or_else(|| op.description.clone()),
                    path_item_parameters: path_item_parameters.clone(),
                    parameters,
                    request_body: None,
                };
                operation.request_body = request_body(&operation.merged_parameters());
                operations.push(operation);
            }
        }
        Ok(operations)
    }
}
