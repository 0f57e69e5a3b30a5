use crate::domain::{Comment, Post};
use crate::error::DomainError;

use super::{Requester, can_view};

/// A write a requester wants to perform.
///
/// Posts and comments are owned per instance by their creator. Categories
/// and tags are shared taxonomies gated by role alone. There is no variant
/// for editing a comment because comments are immutable.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    CreatePost,
    UpdatePost(&'a Post),
    DeletePost(&'a Post),
    CreateComment(&'a Post),
    DeleteComment(&'a Comment),
    ModerateComments,
    ManageCategory,
    ManageTag,
}

impl Mutation<'_> {
    /// User-facing notice shown when the mutation is denied.
    pub fn denial_notice(&self) -> &'static str {
        match self {
            Mutation::CreatePost => "You need author privileges to create posts.",
            Mutation::UpdatePost(_) => "You can only edit your own posts.",
            Mutation::DeletePost(_) => "You can only delete your own posts.",
            Mutation::CreateComment(_) => "This post is not available.",
            Mutation::DeleteComment(_) => "You can only delete your own comments.",
            Mutation::ModerateComments => "Only staff can moderate comments.",
            Mutation::ManageCategory => "You need author privileges to manage categories.",
            Mutation::ManageTag => "You need author privileges to manage tags.",
        }
    }
}

/// Decide whether `requester` may perform `mutation`.
pub fn can_mutate(mutation: Mutation<'_>, requester: &Requester) -> bool {
    match mutation {
        Mutation::CreatePost | Mutation::ManageCategory | Mutation::ManageTag => {
            requester.is_author()
        }
        Mutation::UpdatePost(post) | Mutation::DeletePost(post) => {
            requester.is(post.author_id) || requester.is_staff
        }
        Mutation::CreateComment(post) => can_view(post, Some(requester)),
        Mutation::DeleteComment(comment) => requester.is(comment.user_id) || requester.is_staff,
        Mutation::ModerateComments => requester.is_staff,
    }
}

/// [`can_mutate`] as a `Result`, carrying the denial notice.
pub fn authorize(mutation: Mutation<'_>, requester: &Requester) -> Result<(), DomainError> {
    if can_mutate(mutation, requester) {
        return Ok(());
    }

    tracing::debug!(
        user_id = %requester.user_id,
        mutation = ?mutation,
        "Mutation denied"
    );
    Err(DomainError::denied(mutation.denial_notice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostStatus, Role};
    use uuid::Uuid;

    fn requester(name: &str, role: Role, is_staff: bool) -> Requester {
        Requester {
            user_id: Uuid::new_v4(),
            username: name.into(),
            is_staff,
            role,
        }
    }

    fn post_by(author: &Requester, status: PostStatus) -> Post {
        Post::new(
            author.user_id,
            "Post".into(),
            "post".into(),
            "Body".into(),
            status,
        )
    }

    #[test]
    fn test_post_mutation_is_per_instance() {
        let a = requester("a", Role::Author, false);
        let b = requester("b", Role::Author, false);
        let c = requester("c", Role::Reader, true);
        let post = post_by(&a, PostStatus::Published);

        for mutation in [Mutation::UpdatePost(&post), Mutation::DeletePost(&post)] {
            assert!(can_mutate(mutation, &a));
            assert!(!can_mutate(mutation, &b));
            assert!(can_mutate(mutation, &c));
        }
    }

    #[test]
    fn test_admin_role_does_not_grant_post_ownership() {
        let author = requester("john", Role::Author, false);
        let admin_role = requester("root", Role::Admin, false);
        let post = post_by(&author, PostStatus::Draft);

        assert!(!can_mutate(Mutation::UpdatePost(&post), &admin_role));
    }

    #[test]
    fn test_taxonomy_and_post_creation_are_role_gated() {
        let reader = requester("bob", Role::Reader, false);
        let author = requester("jane", Role::Author, false);
        let admin = requester("root", Role::Admin, false);

        for mutation in [
            Mutation::CreatePost,
            Mutation::ManageCategory,
            Mutation::ManageTag,
        ] {
            assert!(!can_mutate(mutation, &reader));
            assert!(can_mutate(mutation, &author));
            assert!(can_mutate(mutation, &admin));
        }
    }

    #[test]
    fn test_staff_flag_alone_does_not_grant_taxonomy_rights() {
        let staff_reader = requester("mod", Role::Reader, true);
        assert!(!can_mutate(Mutation::ManageCategory, &staff_reader));
    }

    #[test]
    fn test_comment_deletion() {
        let john = requester("john", Role::Author, false);
        let bob = requester("bob", Role::Reader, false);
        let admin = requester("admin", Role::Admin, true);
        let post = post_by(&john, PostStatus::Published);
        let comment = Comment::new(post.id, bob.user_id, "Nice".into());

        assert!(!can_mutate(Mutation::DeleteComment(&comment), &john));
        assert!(can_mutate(Mutation::DeleteComment(&comment), &admin));
        assert!(can_mutate(Mutation::DeleteComment(&comment), &bob));
    }

    #[test]
    fn test_commenting_requires_visibility() {
        let john = requester("john", Role::Author, false);
        let bob = requester("bob", Role::Reader, false);
        let draft = post_by(&john, PostStatus::Draft);
        let published = post_by(&john, PostStatus::Published);

        assert!(!can_mutate(Mutation::CreateComment(&draft), &bob));
        assert!(can_mutate(Mutation::CreateComment(&published), &bob));
        assert!(can_mutate(Mutation::CreateComment(&draft), &john));
    }

    #[test]
    fn test_authorize_carries_notice() {
        let bob = requester("bob", Role::Reader, false);
        let err = authorize(Mutation::CreatePost, &bob).unwrap_err();
        assert!(matches!(err, DomainError::Denied(msg) if msg.contains("author privileges")));
    }
}
