pub mod constants;
pub mod core;
pub mod routers;
pub mod types;
