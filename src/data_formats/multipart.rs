use std::collections::HashMap;

use axum::extract::Multipart;

use crate::{errors::RequestError, storage::Upload};

/// Text fields plus at most one file (the field named `file`) from a multipart body.
#[derive(Debug, Default)]
pub struct FormFields {
    text: HashMap<String, String>,
    pub file: Option<Upload>,
}

impl FormFields {
    pub async fn read(mut multipart: Multipart) -> Result<Self, RequestError> {
        let mut form = FormFields::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| RequestError::BadRequest(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| RequestError::BadRequest(format!("Could not read file: {e}")))?;
                if !bytes.is_empty() {
                    form.file = Some(Upload {
                        name: file_name,
                        mime_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| RequestError::BadRequest(format!("Could not read {name}: {e}")))?;
                form.text.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.text.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, RequestError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(RequestError::BadRequest(format!("{key} is required"))),
        }
    }

    /// Present and non-blank, else None.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    pub fn take_file(&mut self) -> Option<Upload> {
        self.file.take()
    }
}
