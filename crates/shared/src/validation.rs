use crate::constants::*;

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "Username can only contain letters, numbers, hyphens, and underscores".into(),
        );
    }
    Ok(())
}

pub fn validate_group_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Group name is required".into());
    }
    if trimmed.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name must be at most {} characters",
            MAX_GROUP_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_message_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Text message requires text content".into());
    }
    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message too long".into());
    }
    Ok(())
}

pub fn validate_comment_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Comment text is required".into());
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        ));
    }
    Ok(())
}
