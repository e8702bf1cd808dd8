use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::config::ConfigPathError;
use crate::editor::EditorError;
use crate::raster::FontError;
use crate::script::ScriptError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::surface::SurfaceError;
use crate::tools::ToolError;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    ConfigPath(#[from] ConfigPathError),
}
