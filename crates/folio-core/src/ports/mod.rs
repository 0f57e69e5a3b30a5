//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod notification;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use notification::{NotificationError, NotificationEvent, NotificationSink};
pub use repository::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, SavedPost,
    TagRepository, UserRepository,
};
