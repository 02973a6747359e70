pub mod config;
pub mod publish;
pub mod render;
pub mod sensor;
pub mod transport;

pub use config::ConfigError;
pub use publish::PublishError;
pub use render::RenderError;
pub use sensor::SensorError;
pub use transport::TransportError;
