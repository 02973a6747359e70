#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Chart size {width}x{height} is too small to draw")]
    CanvasTooSmall { width: u32, height: u32 },

    #[error("Chart size {width}x{height} is too large to draw")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Failed to encode chart: {0}")]
    Encode(#[from] image::ImageError),
}

// Drawing onto an in-memory canvas cannot fail.
impl From<std::convert::Infallible> for RenderError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
