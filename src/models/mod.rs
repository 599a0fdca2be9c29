pub mod config;
pub mod hooks;
pub mod keycloak;
pub mod naming;
pub mod proto;
pub mod record;
pub mod schema;
pub mod types;
pub mod value;
