/// Largest avatar accepted for upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Trim a task title, rejecting blank ones.
pub fn validate_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }
    Ok(title.to_string())
}

pub fn validate_display_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Display name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

/// Avatars must be images of at most 5 MiB.
pub fn validate_avatar(content_type: &str, size: usize) -> Result<(), String> {
    if !content_type.starts_with("image/") {
        return Err("Please select an image file".to_string());
    }
    if size == 0 {
        return Err("Image file is empty".to_string());
    }
    if size > MAX_AVATAR_BYTES {
        return Err("Image must be smaller than 5MB".to_string());
    }
    Ok(())
}
