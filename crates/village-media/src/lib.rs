pub mod image;
pub mod storage;

pub use image::{validate_image_magic_bytes, ImageKind};
pub use storage::{sanitize_filename, stored_file_name, LocalStorage, StorageBackend, StorageError};
