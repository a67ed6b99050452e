use crate::types::MediaContext;
use std::path::Path;
use ulid::Ulid;

pub enum Error {
    UnexpectedError,
}

/// Persists an uploaded file under the media root and returns the stored
/// file name. Names are prefixed with a fresh ulid so repeated uploads of
/// the same file never clobber each other.
pub async fn store_file(
    media: MediaContext,
    file_name: Option<String>,
    buf: Vec<u8>,
) -> Result<String, Error> {
    let stored_name = match file_name.as_deref().map(base_name) {
        Some(name) if !name.is_empty() => format!("{}_{}", Ulid::new(), name),
        _ => Ulid::new().to_string(),
    };

    tokio::fs::write(media.root.join(&stored_name), buf)
        .await
        .map_err(|err| {
            tracing::error!("Failed to write uploaded file {}: {}", stored_name, err);
            Error::UnexpectedError
        })?;

    Ok(stored_name)
}

/// Public URL for a stored file, served by the static file route.
pub fn file_url(name: &str) -> String {
    format!("/media/{}", name)
}

// Client-supplied file names can carry directory components; only the last
// one is kept.
fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_file_under_media_root_with_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaContext {
            root: dir.path().to_path_buf(),
        };

        let name = store_file(media.clone(), Some("cat.jpg".to_string()), vec![1, 2, 3])
            .await
            .unwrap_or_else(|_| panic!("store failed"));

        assert!(name.ends_with("_cat.jpg"));
        assert_eq!(tokio::fs::read(dir.path().join(&name)).await.unwrap(), [1, 2, 3]);

        let other = store_file(media, Some("cat.jpg".to_string()), vec![])
            .await
            .unwrap_or_else(|_| panic!("store failed"));
        assert_ne!(name, other);
    }

    #[tokio::test]
    async fn strips_directory_components_from_client_names() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaContext {
            root: dir.path().to_path_buf(),
        };

        let name = store_file(media, Some("../../etc/passwd".to_string()), vec![0])
            .await
            .unwrap_or_else(|_| panic!("store failed"));

        assert!(name.ends_with("_passwd"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn file_url_points_at_media_route() {
        assert_eq!(file_url("abc_cat.jpg"), "/media/abc_cat.jpg");
    }
}
