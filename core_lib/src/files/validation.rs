use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File type {content_type} is not allowed")]
    TypeNotAllowed { content_type: String },
}

#[derive(Debug, Clone)]
pub struct FileValidationConfig {
    pub max_file_size: u64,
    pub allowed_content_types: HashSet<String>,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        let mut allowed_types = HashSet::new();

        allowed_types.insert("image/jpeg".to_string());
        allowed_types.insert("image/png".to_string());
        allowed_types.insert("image/gif".to_string());

        allowed_types.insert("application/pdf".to_string());
        allowed_types.insert("text/plain".to_string());

        allowed_types.insert("application/msword".to_string());
        allowed_types.insert("application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string());

        Self {
            max_file_size: 10 * 1024 * 1024,
            allowed_content_types: allowed_types,
        }
    }
}

/// Checks declared size and content type against policy before any byte
/// reaches the disk.
#[derive(Clone)]
pub struct FileValidator {
    config: FileValidationConfig,
}

impl FileValidator {
    pub fn new(config: FileValidationConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(FileValidationConfig::default())
    }

    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), ValidationError> {
        if size > self.config.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max_size: self.config.max_file_size,
            });
        }

        self.validate_content_type(content_type)?;

        Ok(())
    }

    fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.config.allowed_content_types.contains(content_type) {
            return Err(ValidationError::TypeNotAllowed {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type() {
        let validator = FileValidator::with_default_config();

        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("image/png").is_ok());
        assert!(validator.validate_content_type("application/pdf").is_ok());
        assert!(validator.validate_content_type("text/plain").is_ok());
        assert!(validator.validate_content_type("application/msword").is_ok());

        assert!(validator.validate_content_type("application/json").is_err());
        assert!(validator.validate_content_type("application/x-executable").is_err());
        assert!(validator.validate_content_type("").is_err());
    }

    #[test]
    fn test_validate_size() {
        let validator = FileValidator::with_default_config();

        assert!(validator.validate_upload("text/plain", 0).is_ok());
        assert!(validator.validate_upload("text/plain", 10 * 1024 * 1024).is_ok());

        let result = validator.validate_upload("text/plain", 10 * 1024 * 1024 + 1);
        match result {
            Err(ValidationError::FileTooLarge { size, max_size }) => {
                assert_eq!(size, 10 * 1024 * 1024 + 1);
                assert_eq!(max_size, 10 * 1024 * 1024);
            }
            other => panic!("expected FileTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_policy() {
        let mut allowed = HashSet::new();
        allowed.insert("text/plain".to_string());

        let validator = FileValidator::new(FileValidationConfig {
            max_file_size: 16,
            allowed_content_types: allowed,
        });

        assert!(validator.validate_upload("text/plain", 16).is_ok());
        assert!(validator.validate_upload("text/plain", 17).is_err());
        assert!(validator.validate_upload("image/jpeg", 1).is_err());
    }

    #[test]
    fn test_error_message_reports_limit() {
        let validator = FileValidator::with_default_config();
        let err = validator
            .validate_upload("text/plain", 15 * 1024 * 1024)
            .unwrap_err();
        assert!(err.to_string().contains("10485760"));
    }
}
