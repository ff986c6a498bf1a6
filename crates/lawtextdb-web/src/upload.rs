use axum::extract::Multipart;
use lawtextdb_core::UploadedFile;

/// Form fields that may carry the uploaded document.
const FILE_FIELDS: [&str; 2] = ["file", "pdf"];

/// Pull the uploaded document out of a multipart form.
///
/// The first `file` or `pdf` field wins; other fields are drained and
/// ignored. `Ok(None)` means the form held no document.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<Option<UploadedFile>, String> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if file.is_none() && FILE_FIELDS.contains(&name.as_str()) {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file data: {}", e))?
                .to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            let _ = field.bytes().await;
        }
    }

    Ok(file)
}
