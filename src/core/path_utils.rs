/*
 * Locates the explorer's per-user configuration directory. Everything the
 * explorer persists on its own behalf lives directly under the platform's
 * local (non-roaming) configuration directory for the application name.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Returns the local configuration directory for `app_name`, creating it if
 * needed. `None` means the platform has no home directory to derive it from, or
 * the directory could not be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if !config_path.exists() {
        if let Err(e) = fs::create_dir_all(config_path) {
            log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory {config_path:?}");
    }
    Some(config_path.to_path_buf())
}

// Full path of a named file inside the application's config directory.
pub fn config_file_path(app_name: &str, file_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(file_name))
}
