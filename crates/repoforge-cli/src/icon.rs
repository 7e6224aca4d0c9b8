//! Loading the app icon chosen on the command line.

use std::path::Path;

use repoforge_core::{AppIcon, IconError};

/// Read and sniff an icon file. A missing flag is not an error here; the
/// build request reports it.
pub async fn load_icon(path: Option<&Path>) -> Result<Option<AppIcon>, IconError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path).await?;
    Ok(Some(AppIcon::from_bytes(bytes)?))
}

/// Short label drawn in place of the icon on the device preview.
pub fn marker(icon: Option<&AppIcon>) -> String {
    match icon {
        Some(icon) => format!("{:?}", icon.format()).to_uppercase(),
        None => "APP".to_string(),
    }
}
