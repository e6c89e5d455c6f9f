pub mod category;
pub mod models;
pub mod store;
pub mod validation;

pub use category::FileCategory;
pub use models::{FileRecord, FileUpload, StoredFile};
pub use store::{FileStore, FileStoreConfig, StorageStats};
pub use validation::{FileValidationConfig, FileValidator, ValidationError};
