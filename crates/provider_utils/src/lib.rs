pub mod constants;
pub mod enums;
pub mod http_providers;
pub mod networks;
pub mod ws_providers;
