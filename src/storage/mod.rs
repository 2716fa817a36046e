use log::info;

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::errors::ServiceError;

/// Filesystem sink for train images. The directory comes from the
/// environment so deployments can point it at a mounted volume.
pub struct ImageStore {
    directory: PathBuf,
}

impl ImageStore {
    pub fn from_env() -> ImageStore {
        let default_image_dir = String::from("/var/lib/station-booking/images");

        ImageStore {
            directory: PathBuf::from(env::var("TRAIN_IMAGE_DIR").unwrap_or(default_image_dir)),
        }
    }

    pub fn extension_for(content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/png" => Some("png"),
            "image/jpeg" => Some("jpg"),
            _ => None,
        }
    }

    /// Writes the image and returns the stored path. A re-upload for the
    /// same train and format overwrites the previous file.
    pub fn save(&self, train_id: i32, extension: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        fs::create_dir_all(&self.directory)?;

        let path = self.directory.join(format!("train_{}.{}", train_id, extension));
        fs::write(&path, bytes)?;
        info!("Stored train {} image at {}", train_id, path.display());

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_image_types_map_to_extensions() {
        assert_eq!(ImageStore::extension_for("image/png"), Some("png"));
        assert_eq!(ImageStore::extension_for("image/jpeg"), Some("jpg"));
    }

    #[test]
    fn unknown_content_types_are_refused() {
        assert_eq!(ImageStore::extension_for("text/plain"), None);
        assert_eq!(ImageStore::extension_for("application/json"), None);
    }

    #[test]
    fn save_writes_the_image_to_disk() {
        let store = ImageStore {
            directory: env::temp_dir().join("station-booking-test-images"),
        };
        let path = store.save(42, "png", b"not a real png").unwrap();

        assert!(path.ends_with("train_42.png"));
        assert_eq!(fs::read(&path).unwrap(), b"not a real png");

        fs::remove_file(&path).unwrap();
    }
}
