pms_macro::generate_api!(path = "../test-data/pms-swagger.json", module_name = "pms");
