//! SeaORM entities mirroring the schema created by the migration app.

pub mod category;
pub mod comment;
pub mod post;
pub mod post_tag;
pub mod profile;
pub mod tag;
pub mod user;
