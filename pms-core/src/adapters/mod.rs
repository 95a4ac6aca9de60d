#[cfg(feature = "oas30")]
pub mod oas30;
#[cfg(feature = "swagger20")]
pub mod swagger20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentVersion {
    #[cfg(feature = "swagger20")]
    Swagger20,
    #[cfg(feature = "oas30")]
    OAS30,
}

/// Content types that are sent as `application/x-www-form-urlencoded`
/// fields rather than as a JSON document.
pub(crate) fn is_form_content_type(content_type: &str) -> bool {
    let ct = content_type.split(';').next().unwrap_or("").trim();
    ct.eq_ignore_ascii_case("application/x-www-form-urlencoded")
        || ct.eq_ignore_ascii_case("multipart/form-data")
}
