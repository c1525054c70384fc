mod pancake_router_service;

pub use pancake_router_service::*;
