//! Custom request extractors.

mod upload;
mod validated_json;

pub use upload::{read_upload_form, UploadForm};
pub use validated_json::ValidatedJson;
