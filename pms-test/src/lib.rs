//! Endpoint modules generated from the PMS backend document, once by the
//! build script and once by the `generate_api!` macro.

use serde::{Deserialize, Serialize};

include!(concat!(env!("OUT_DIR"), "/pms_api.rs"));

pub mod from_macro;

/// Request body of `message_create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub title: String,
    pub body: String,
    pub project: u64,
}

#[cfg(test)]
mod tests {
    use pms_client::model::HttpVerb;

    use super::*;

    #[test]
    fn test_generated_table() {
        let table = pms_api::endpoints();
        assert_eq!(table.len(), 15);
        table.validate().unwrap();

        let category = table.get("category_read").unwrap();
        assert_eq!(category.method, HttpVerb::Get);
        assert_eq!(category.path, "/api/project/category/{id}/");
        assert_eq!(category.query_params[0].external, "categoryType");
        assert_eq!(category.query_params[0].internal, "category_type");
    }

    #[test]
    fn test_both_generators_agree() {
        assert_eq!(pms_api::endpoints(), from_macro::pms::endpoints());
    }
}
