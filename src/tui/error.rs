use thiserror::Error;

use crate::board::BoardError;
use crate::dashboard::DashboardError;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Board error: {0}")]
    BoardError(#[from] BoardError),

    #[error("Overview error: {0}")]
    DashboardError(#[from] DashboardError),

    #[error("Render error: {0}")]
    RenderError(String),
}
