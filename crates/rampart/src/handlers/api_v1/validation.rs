//! input validation for api v1 endpoints

use super::super::ApiError;

/// maximum length for resource names (characters)
pub const MAX_RESOURCE_NAME_LEN: usize = 255;

/// maximum length for descriptions (characters)
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// validate a resource name for api operations
///
/// resource names are free-form labels, only bounded in length
pub fn validate_resource_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("resource name cannot be empty"));
    }
    if name.chars().count() > MAX_RESOURCE_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "resource name too long (max {} characters)",
            MAX_RESOURCE_NAME_LEN
        )));
    }
    Ok(())
}

/// validate an optional description
pub fn validate_description(description: Option<&str>) -> Result<(), ApiError> {
    if let Some(description) = description
        && description.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err(ApiError::bad_request(format!(
            "description too long (max {} characters)",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_resource_names() {
        assert!(validate_resource_name("web").is_ok());
        assert!(validate_resource_name("Internal Wiki (staging)").is_ok());
        assert!(validate_resource_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn test_invalid_resource_names() {
        assert!(validate_resource_name("").is_err());
        assert!(validate_resource_name("   ").is_err());
        assert!(validate_resource_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_description_length() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("short")).is_ok());
        assert!(validate_description(Some(&"d".repeat(1025))).is_err());
    }
}
