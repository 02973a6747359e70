mod channel;
mod color;
mod reading;

pub use channel::*;
pub use color::*;
pub use reading::*;
