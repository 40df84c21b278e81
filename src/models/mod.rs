pub mod content;
pub mod user;

pub use content::{
    split_by_type, BrowseQuery, ContentFilter, ContentItem, ContentType, Recommendation,
    RecommendationQuery, SortBy,
};
pub use user::{
    Credentials, LoginResponse, ProfileUpdate, ProfileUpdateRequest, User, UserProfile,
};

/// Identifier the API assigns to a user account
pub type UserId = i64;

/// Identifier of a catalog entry
pub type ContentId = i64;
