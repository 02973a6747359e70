use std::sync::Arc;

use crate::app::create_sampler;
use crate::configs::Settings;
use crate::errors::ConfigError;

pub mod app;
pub mod configs;
pub mod errors;
pub mod services;

/// Sample until `shutdown` resolves.
pub async fn run<S>(settings: &Arc<Settings>, shutdown: S) -> Result<(), ConfigError>
where
    S: Future<Output = ()>,
{
    let mut sampler = create_sampler(settings).await?;

    tracing::info!("airsync {} starting", env!("CARGO_PKG_VERSION"));

    sampler.run(shutdown).await;

    Ok(())
}
