pub mod artifact;
pub mod chart;
pub mod sampler;
pub mod sensor;
pub mod telemetry;

pub use artifact::*;
pub use chart::*;
pub use sampler::*;
pub use sensor::*;
pub use telemetry::*;
