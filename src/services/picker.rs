use async_trait::async_trait;
use camino::Utf8PathBuf;
use directories::UserDirs;

/// Native single-directory selection.
///
/// `None` means the user cancelled. Callers must treat it as its own outcome
/// and never pass it on as a directory.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    async fn pick_directory(&self) -> Option<Utf8PathBuf>;
}

/// Directory picker backed by the `rfd` native dialog.
///
/// Opens at the user's home directory and allows a single selection.
#[derive(Debug, Clone)]
pub struct NativeDirectoryPicker {
    title: String,
}

impl NativeDirectoryPicker {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// The user's home directory, if the platform reports one
    pub fn home_dir() -> Option<Utf8PathBuf> {
        let home = UserDirs::new()?.home_dir().to_path_buf();
        Utf8PathBuf::try_from(home)
            .map_err(|e| {
                tracing::warn!("Home directory is not valid UTF-8: {}", e);
                e
            })
            .ok()
    }
}

impl Default for NativeDirectoryPicker {
    fn default() -> Self {
        Self::new("Select chart directory")
    }
}

#[async_trait]
impl DirectoryPicker for NativeDirectoryPicker {
    async fn pick_directory(&self) -> Option<Utf8PathBuf> {
        let title = self.title.clone();

        // The blocking dialog runs off the async workers
        let picked = tokio::task::spawn_blocking(move || {
            let mut dialog = rfd::FileDialog::new().set_title(title.as_str());
            if let Some(home) = Self::home_dir() {
                dialog = dialog.set_directory(home.as_std_path());
            }
            dialog.pick_folder()
        })
        .await
        .map_err(|e| {
            tracing::error!("Directory picker task failed: {}", e);
            e
        })
        .ok()
        .flatten();

        match picked {
            Some(path) => Utf8PathBuf::try_from(path)
                .map_err(|e| {
                    tracing::error!("Failed to convert path to UTF-8: {}", e);
                    e
                })
                .ok(),
            None => {
                tracing::info!("Directory selection cancelled");
                None
            }
        }
    }
}
