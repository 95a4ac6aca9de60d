use http::Request;
use http::header::CONTENT_TYPE;
use pms_model::{
    ApiError, BODY_PARAM, CallParameters, EndpointDescriptor, HeaderSet, ParamMapping,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn missing(endpoint: &EndpointDescriptor, parameter: &str) -> ApiError {
    ApiError::MissingParameter {
        endpoint: endpoint.name.clone(),
        parameter: parameter.to_string(),
    }
}

/// Fails with `MissingParameter` for the first required parameter that has
/// no value. Runs before anything else so an invalid call never reaches the
/// transport.
fn check_required(
    endpoint: &EndpointDescriptor,
    params: &CallParameters,
) -> Result<(), ApiError> {
    let mappings = endpoint
        .path_params
        .iter()
        .chain(&endpoint.query_params)
        .chain(&endpoint.header_params)
        .chain(&endpoint.form_params);
    for m in mappings {
        if m.required && !params.contains(&m.external) {
            return Err(missing(endpoint, &m.external));
        }
    }
    if endpoint.has_body && endpoint.body_required && !params.contains(BODY_PARAM) {
        return Err(missing(endpoint, BODY_PARAM));
    }
    Ok(())
}

/// Substitutes every `{name}` placeholder of the path template. The value
/// comes from the path mapping whose internal name matches the placeholder,
/// or from a parameter of the placeholder's own name if there is none.
fn build_path(endpoint: &EndpointDescriptor, params: &CallParameters) -> Result<String, ApiError> {
    let mut path = endpoint.path.clone();
    for placeholder in endpoint.placeholders() {
        let external = endpoint
            .path_params
            .iter()
            .find(|m| m.internal == placeholder)
            .map(|m| m.external.as_str())
            .unwrap_or(placeholder);
        let value = params
            .get_string(external)
            .ok_or_else(|| missing(endpoint, external))?;
        path = path.replace(
            &format!("{{{placeholder}}}"),
            &urlencoding::encode(&value),
        );
    }
    Ok(path)
}

/// `internal=value` pairs for all mapped parameters present in the call.
fn encode_pairs(mappings: &[ParamMapping], params: &CallParameters) -> Vec<String> {
    mappings
        .iter()
        .filter_map(|m| {
            params
                .get_string(&m.external)
                .map(|value| format!("{}={}", m.internal, urlencoding::encode(&value)))
        })
        .collect()
}

fn build_query(endpoint: &EndpointDescriptor, params: &CallParameters) -> String {
    let mut pairs = encode_pairs(&endpoint.query_params, params);
    pairs.extend(params.extra_query().map(|(name, value)| {
        let value = pms_model::value_to_param_string(value);
        format!("{name}={}", urlencoding::encode(&value))
    }));
    pairs.join("&")
}

/// Composes the HTTP request for one call of `endpoint`.
///
/// `headers` is the header snapshot of the call; header parameters of the
/// endpoint are added on top of it. When the call carries form parameters the
/// body is form encoded, otherwise the `data` parameter (if the endpoint
/// takes a body) is sent as JSON.
pub fn build_request(
    base_url: &str,
    endpoint: &EndpointDescriptor,
    params: &CallParameters,
    headers: &HeaderSet,
) -> Result<Request<Vec<u8>>, ApiError> {
    check_required(endpoint, params)?;

    let mut url = format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        build_path(endpoint, params)?
    );
    let query = build_query(endpoint, params);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    let mut headers = headers.clone();
    for m in &endpoint.header_params {
        if let Some(value) = params.get_string(&m.external) {
            headers.replace(&m.internal, &value)?;
        }
    }

    let form = encode_pairs(&endpoint.form_params, params);
    let body = if !form.is_empty() {
        headers.replace(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)?;
        form.join("&").into_bytes()
    } else {
        match params.get(BODY_PARAM) {
            Some(data) if endpoint.has_body => {
                serde_json::to_vec(data).map_err(|e| ApiError::InvalidRequest {
                    endpoint: endpoint.name.clone(),
                    source: e.into(),
                })?
            }
            _ => Vec::new(),
        }
    };

    let mut request = Request::builder()
        .method(endpoint.method.as_method())
        .uri(&url)
        .body(body)
        .map_err(|e| ApiError::InvalidRequest {
            endpoint: endpoint.name.clone(),
            source: e.into(),
        })?;
    *request.headers_mut() = headers.to_header_map();
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pms_model::HttpVerb;
    use serde_json::json;
    use test_log::test;

    const BASE: &str = "http://pms.test";

    fn category_read() -> EndpointDescriptor {
        EndpointDescriptor::new("category_read", HttpVerb::Get, "/api/project/category/{id}/")
            .query("categoryType", "category_type")
    }

    #[test]
    fn test_path_and_query() {
        let params = CallParameters::new()
            .with("id", 7)
            .with("categoryType", "project");
        let req = build_request(BASE, &category_read(), &params, &HeaderSet::new()).unwrap();
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(
            req.uri().to_string(),
            "http://pms.test/api/project/category/7/?category_type=project"
        );
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_no_query_without_values() {
        let params = CallParameters::new().with("id", "a b");
        let req = build_request(BASE, &category_read(), &params, &HeaderSet::new()).unwrap();
        assert_eq!(
            req.uri().to_string(),
            "http://pms.test/api/project/category/a%20b/"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let e = EndpointDescriptor::new("message_list", HttpVerb::Get, "/api/message/message/")
            .query("search", "search")
            .query("pageSize", "page_size");
        let params = CallParameters::new()
            .with("search", "a&b=c")
            .with("pageSize", 10)
            .with("unrelated", "ignored")
            .with_extra_query("ordering", "-created");
        let req = build_request(BASE, &e, &params, &HeaderSet::new()).unwrap();
        assert_eq!(
            req.uri().query(),
            Some("search=a%26b%3Dc&page_size=10&ordering=-created")
        );
    }

    #[test]
    fn test_missing_path_parameter() {
        let err = build_request(BASE, &category_read(), &CallParameters::new(), &HeaderSet::new())
            .unwrap_err();
        match err {
            ApiError::MissingParameter { endpoint, parameter } => {
                assert_eq!(endpoint, "category_read");
                assert_eq!(parameter, "id");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_placeholder() {
        // placeholder without a path mapping still needs a value
        let e = EndpointDescriptor::new("x", HttpVerb::Get, "/api/{company_id}/")
            .with_path_params(Vec::new());
        let err = build_request(BASE, &e, &CallParameters::new(), &HeaderSet::new()).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter { parameter, .. } if parameter == "company_id"));

        let params = CallParameters::new().with("company_id", 3);
        let req = build_request(BASE, &e, &params, &HeaderSet::new()).unwrap();
        assert_eq!(req.uri().path(), "/api/3/");
    }

    #[test]
    fn test_required_query_and_body() {
        let e = EndpointDescriptor::new("jira_issues_list", HttpVerb::Get, "/api/jira/issues/")
            .required_query("project", "project");
        let err = build_request(BASE, &e, &CallParameters::new(), &HeaderSet::new()).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter { parameter, .. } if parameter == "project"));

        let e = EndpointDescriptor::new("message_create", HttpVerb::Post, "/api/message/message/")
            .body(true);
        let err = build_request(BASE, &e, &CallParameters::new(), &HeaderSet::new()).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter { parameter, .. } if parameter == "data"));
    }

    #[test]
    fn test_json_body_and_headers() {
        let e = EndpointDescriptor::new("message_create", HttpVerb::Post, "/api/message/message/")
            .body(true)
            .header("xProject", "X-Project", false);
        let mut headers = HeaderSet::new();
        headers.add("Accept", "application/json").unwrap();
        let params = CallParameters::new()
            .with("data", json!({"title": "Hello", "project": 1}))
            .with("xProject", 1);

        let req = build_request(BASE, &e, &params, &headers).unwrap();
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.headers()["accept"], "application/json");
        assert_eq!(req.headers()["x-project"], "1");
        let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap();
        assert_eq!(body, json!({"title": "Hello", "project": 1}));
    }

    #[test]
    fn test_body_ignored_without_has_body() {
        let e = EndpointDescriptor::new("message_read", HttpVerb::Get, "/api/message/message/");
        let params = CallParameters::new().with("data", json!({"a": 1}));
        let req = build_request(BASE, &e, &params, &HeaderSet::new()).unwrap();
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_form_body() {
        let e = EndpointDescriptor::new("attachment_create", HttpVerb::Post, "/api/project/attachment/")
            .form("project", "project", true)
            .form("message", "message", false);
        let mut headers = HeaderSet::new();
        headers.add("Content-Type", "application/json").unwrap();
        let params = CallParameters::new().with("project", 4).with("message", "see attached");

        let req = build_request(BASE, &e, &params, &headers).unwrap();
        assert_eq!(
            req.headers()["content-type"],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(req.body().as_slice(), b"project=4&message=see%20attached");
    }

    #[test]
    fn test_idempotent() {
        let params = CallParameters::new().with("id", 7).with("categoryType", "project");
        let a = build_request(BASE, &category_read(), &params, &HeaderSet::new()).unwrap();
        let b = build_request(BASE, &category_read(), &params, &HeaderSet::new()).unwrap();
        assert_eq!(a.uri(), b.uri());
        assert_eq!(a.body(), b.body());
    }
}
