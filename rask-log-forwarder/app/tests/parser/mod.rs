// Legacy tests
pub mod test_docker_json;
pub mod test_nginx_access;
pub mod test_nginx_error;

pub mod test_docker_json_extended;
pub mod test_service_parsers;
pub mod test_universal_parser;

// Mock tests
pub mod test_parser_mocked;
