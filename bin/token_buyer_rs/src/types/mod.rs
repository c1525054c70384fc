mod common_types;
mod message_transport_types;
mod purchase_types;
mod swap_types;

pub use common_types::*;
pub use message_transport_types::*;
pub use purchase_types::*;
pub use swap_types::*;
