pub mod default_route;
pub mod extract_route;
pub mod health_check_route;
