//! Domain entities - the content aggregate and the accounts that act on it.

mod category;
mod comment;
mod page;
mod post;
mod slug;
mod tag;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use page::{DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use post::{Post, PostStatus};
pub use slug::{MAX_SLUG_LENGTH, slugify};
pub use tag::Tag;
pub use user::{Profile, Role, User};
