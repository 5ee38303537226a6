//! Input Validation Utilities
//!
//! Small validators used at stage boundaries so that malformed inputs fail
//! with a typed error instead of a panic.

use crate::core::OCRError;

/// Validates image dimensions.
pub fn validate_image_dimensions(width: u32, height: u32, context: &str) -> Result<(), OCRError> {
    if height == 0 || width == 0 {
        return Err(OCRError::InvalidInput {
            message: format!(
                "{}: image dimensions must be positive, got {}x{}",
                context, width, height
            ),
        });
    }

    const MAX_DIMENSION: u32 = 32768;
    if height > MAX_DIMENSION || width > MAX_DIMENSION {
        return Err(OCRError::InvalidInput {
            message: format!(
                "{}: image dimensions exceed maximum of {}x{}, got {}x{}",
                context, MAX_DIMENSION, MAX_DIMENSION, width, height
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_dimensions() {
        assert!(validate_image_dimensions(800, 600, "page").is_ok());
        assert!(validate_image_dimensions(0, 600, "page").is_err());
        assert!(validate_image_dimensions(40000, 600, "page").is_err());
    }
}
