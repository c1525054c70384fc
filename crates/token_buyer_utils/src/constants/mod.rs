mod addresses;
mod pancake;
mod wrapped_native;

pub use addresses::*;
pub use pancake::*;
pub use wrapped_native::*;
