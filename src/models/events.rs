use std::path::PathBuf;

/// One record of a native batch notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
}

impl From<PathBuf> for FileChange {
    fn from(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Signals carried by the page-wide event bus
///
/// Each variant has a fixed wire name (see [`AppEvent::name`]) matching the
/// names the page scripts listen for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Fired once at startup after the request hook is installed
    LibrariesReady,

    /// Fired once per changed path under the watched chart directory
    TemplateFileChanged { path: PathBuf },

    /// Any caller may raise this to tear down the active file watch
    StopFileWatch,
}

impl AppEvent {
    pub const LIBRARIES_READY: &'static str = "helmad:libs-ready";
    pub const TEMPLATE_FILE_CHANGED: &'static str = "helmad:templateFileChanged";
    pub const STOP_FILE_WATCH: &'static str = "helmad:stopFileWatch";

    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::LibrariesReady => Self::LIBRARIES_READY,
            AppEvent::TemplateFileChanged { .. } => Self::TEMPLATE_FILE_CHANGED,
            AppEvent::StopFileWatch => Self::STOP_FILE_WATCH,
        }
    }
}
