//! Reading a single file from a multipart body.

use crate::error::{ApiError, ApiResult};
use axum::extract::Multipart;
use bytes::Bytes;

/// One uploaded file.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Lower-cased extension of the client file name.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Take the file part named `field`, rejecting it when larger than
/// `max_bytes`. Other parts are ignored.
pub async fn read_file(mut multipart: Multipart, field: &str, max_bytes: usize) -> ApiResult<Upload> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if part.name() != Some(field) {
            continue;
        }

        let file_name = part.file_name().unwrap_or_default().to_string();
        let content_type = part.content_type().map(str::to_string);
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if bytes.len() > max_bytes {
            return Err(ApiError::field(
                field,
                format!(
                    "The {field} may not be greater than {} kilobytes.",
                    max_bytes / 1024
                ),
            ));
        }

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::field(field, format!("The {field} field is required.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: None,
            bytes: Bytes::new(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(upload("photo.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(upload("data.tar.csv").extension().as_deref(), Some("csv"));
        assert_eq!(upload("noext").extension(), None);
        assert_eq!(upload("trailing.").extension(), None);
    }
}
