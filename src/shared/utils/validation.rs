use crate::shared::errors::AppError;

pub struct Validator;

impl Validator {
    pub fn validate_provider_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Provider name is required".to_string(),
            ));
        }
        if name.len() > 255 {
            return Err(AppError::ValidationError(
                "Provider name too long (max 255 characters)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_pagination(page: u32, limit: u32) -> Result<(), AppError> {
        if page == 0 {
            return Err(AppError::ValidationError(
                "Page numbers start at 1".to_string(),
            ));
        }
        if limit == 0 {
            return Err(AppError::ValidationError(
                "Limit must be positive".to_string(),
            ));
        }
        if limit > 100 {
            return Err(AppError::ValidationError(
                "Limit cannot exceed 100".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_chunk_size(chunk_size: u32) -> Result<(), AppError> {
        if chunk_size == 0 {
            return Err(AppError::ValidationError(
                "Chunk size must be positive".to_string(),
            ));
        }
        if chunk_size > 500 {
            return Err(AppError::ValidationError(
                "Chunk size cannot exceed 500 rows".to_string(),
            ));
        }
        Ok(())
    }
}
