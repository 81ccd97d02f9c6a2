pub const APP_NAME: &str = "Parley";

// Limits
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 25;
pub const MAX_GROUP_NAME_LENGTH: usize = 100;
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_COMMENT_LENGTH: usize = 1000;

// Result caps
pub const USER_SEARCH_LIMIT: i64 = 700;
pub const CONVERSATION_LIST_LIMIT: i64 = 1000;
pub const COMMENT_LIST_LIMIT: i64 = 100;
pub const COMMENT_AUTHOR_PREVIEW: i64 = 3;

/// Shown in conversation summaries when the latest message is a photo.
pub const PHOTO_PREVIEW: &str = "Photo";

/// 5x5 red PNG handed to every new account until they upload their own.
pub const DEFAULT_PHOTO_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAUAAAAFCAYAAACNbyblAAAAHElEQVQI12P4//8/w38GIAXDIBKE0DHxgljNBAAO9TXL0Y4OHwAAAABJRU5ErkJggg==";
