//! Multipart form reader that persists the uploaded image first.
//!
//! The image part is written to the asset store as soon as it is read, so
//! only its path travels further. If reading the rest of the form fails the
//! stored file is discarded here.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::config::image_extension;
use crate::errors::{AppError, AppResult};
use crate::infra::assets::{self, AssetStore};

/// Name of the multipart part carrying the file
const IMAGE_FIELD: &str = "image";

/// Text fields of a multipart form plus the stored image path, if any
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub image: Option<String>,
}

impl UploadForm {
    /// Text field value, empty when absent
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Take the stored image path, failing validation when none was sent
    pub fn take_image(&mut self) -> AppResult<String> {
        self.image
            .take()
            .ok_or_else(|| AppError::validation("image is required"))
    }
}

/// Read every part of `multipart`, storing the image through `assets`.
pub async fn read_upload_form(
    mut multipart: Multipart,
    assets: &dyn AssetStore,
) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    if let Err(e) = collect(&mut multipart, assets, &mut form).await {
        if let Some(path) = form.image.take() {
            assets::discard(assets, &path).await;
        }
        return Err(e);
    }

    Ok(form)
}

async fn collect(
    multipart: &mut Multipart,
    assets: &dyn AssetStore,
    form: &mut UploadForm,
) -> AppResult<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            if form.image.is_some() {
                return Err(AppError::validation("only one image may be uploaded"));
            }

            let ext = field
                .content_type()
                .and_then(image_extension)
                .ok_or_else(|| AppError::validation("Invalid mime type"))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;

            form.image = Some(assets.store(ext, bytes.to_vec()).await?);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(())
}
