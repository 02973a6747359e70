pub mod classify;
pub mod models;
pub mod time;
pub mod window;

pub use classify::{classify, Band, Family};
pub use models::{Channel, Color, Palette, Reading};
pub use window::{Series, WindowBuffer};
