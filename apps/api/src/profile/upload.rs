//! CV document storage. Accepts PDF and Word documents up to 5 MiB and
//! stores them under `cvs/{owner}/` with a sanitized file name.

use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

const ALLOWED_CV_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document", // .docx
    "application/msword",                                                      // .doc
];

const MAX_CV_BYTES: usize = 5 * 1024 * 1024;

pub struct StoredCv {
    pub url: String,
    pub file_name: String,
}

pub fn validate_cv_file(content_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_CV_TYPES.contains(&content_type) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a PDF or Word document.".to_string(),
        ));
    }
    if size > MAX_CV_BYTES {
        return Err(AppError::Validation(
            "File size exceeds 5MB limit.".to_string(),
        ));
    }
    Ok(())
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Uploads the document and returns its public URL and object key.
pub async fn store_cv(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    public_url: &str,
    owner_id: Uuid,
    file_name: &str,
    content_type: &str,
    data: Vec<u8>,
) -> Result<StoredCv, AppError> {
    let sanitized = sanitize_file_name(file_name);
    let key = format!("cvs/{}/{}-{}", owner_id, Uuid::new_v4(), sanitized);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("CV upload failed: {e}")))?;

    info!("Uploaded CV to s3://{bucket}/{key}");

    Ok(StoredCv {
        url: format!("{}/{}", public_url.trim_end_matches('/'), key),
        file_name: file_name.to_string(),
    })
}
