//! End-to-end use cases over the in-memory backend.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use folio_core::domain::{PostStatus, Profile, Role, User};
use folio_core::ports::UserRepository;
use folio_core::service::{CategoryInput, NewAccount, PostInput, ProfileChanges, Repositories};
use folio_core::{BlogService, DomainError, PublicationLifecycle, Requester};
use folio_infra::{InMemoryNotificationSink, InMemoryStore};

struct Harness {
    store: Arc<InMemoryStore>,
    sink: Arc<InMemoryNotificationSink>,
    service: BlogService,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let sink = Arc::new(InMemoryNotificationSink::default());
        let service = BlogService::new(
            Repositories::from_store(store.clone()),
            PublicationLifecycle::new(sink.clone()),
            6,
        );
        Self {
            store,
            sink,
            service,
        }
    }

    async fn register(&self, username: &str, role: Role) -> Requester {
        let (user, _) = self
            .service
            .register(NewAccount {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .unwrap();
        self.service.requester(user.id).await.unwrap()
    }

    /// Staff superuser, provisioned outside self-registration.
    async fn admin(&self) -> Requester {
        let mut user = User::new("admin".into(), "admin@example.com".into(), "hash".into());
        user.is_staff = true;
        user.is_superuser = true;
        let profile = Profile::new(user.id, Role::Reader);
        let (user, _) = self
            .store
            .create_with_profile(user, profile)
            .await
            .unwrap();
        self.service.requester(user.id).await.unwrap()
    }

    /// Let spawned notification tasks run.
    async fn settle(&self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}

fn input(title: &str, status: PostStatus) -> PostInput {
    PostInput {
        title: title.to_string(),
        content: format!("{title} body"),
        featured_image: None,
        status,
        category_id: None,
        tag_ids: Vec::new(),
    }
}

#[tokio::test]
async fn test_draft_becomes_visible_after_publishing() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let bob = h.register("bob", Role::Reader).await;
    let admin = h.admin().await;

    let post = h
        .service
        .create_post(&john, input("Hello", PostStatus::Draft))
        .await
        .unwrap();

    let err = h.service.post_detail(&post.slug, Some(&bob)).await.unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));
    assert!(h.service.post_detail(&post.slug, None).await.is_err());
    assert!(h.service.post_detail(&post.slug, Some(&admin)).await.is_ok());
    assert!(h.service.post_detail(&post.slug, Some(&john)).await.is_ok());

    h.service
        .update_post(&john, &post.slug, input("Hello", PostStatus::Published))
        .await
        .unwrap();
    h.settle().await;

    let events = h.sink.delivered();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].post_id(), post.id);
    assert_eq!(events[0].kind(), "postPublished");

    let detail = h.service.post_detail(&post.slug, Some(&bob)).await.unwrap();
    assert_eq!(detail.post.status, PostStatus::Published);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishes_notify_once() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let admin = h.admin().await;
    let mut events = h.sink.subscribe();

    let post = h
        .service
        .create_post(&john, input("Race", PostStatus::Draft))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let service = h.service.clone();
            let editor = if i % 2 == 0 { john.clone() } else { admin.clone() };
            let slug = post.slug.clone();
            tokio::spawn(async move {
                service
                    .update_post(&editor, &slug, input("Race", PostStatus::Published))
                    .await
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let first = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("publish notification")
        .unwrap();
    assert_eq!(first.post_id(), post.id);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.sink.delivered().len(), 1);
}

#[tokio::test]
async fn test_only_draft_to_published_notifies() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    let live = h
        .service
        .create_post(&john, input("Live", PostStatus::Published))
        .await
        .unwrap();
    let draft = h
        .service
        .create_post(&john, input("Draft", PostStatus::Draft))
        .await
        .unwrap();

    h.service
        .update_post(&john, &draft.slug, input("Draft", PostStatus::Draft))
        .await
        .unwrap();
    h.service
        .update_post(&john, &live.slug, input("Live again", PostStatus::Published))
        .await
        .unwrap();
    h.service
        .update_post(&john, &live.slug, input("Live", PostStatus::Draft))
        .await
        .unwrap();
    h.settle().await;

    assert!(h.sink.delivered().is_empty());
}

#[tokio::test]
async fn test_republishing_notifies_each_transition() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    let post = h
        .service
        .create_post(&john, input("Cycle", PostStatus::Draft))
        .await
        .unwrap();
    for status in [
        PostStatus::Published,
        PostStatus::Published,
        PostStatus::Draft,
        PostStatus::Published,
    ] {
        h.service
            .update_post(&john, &post.slug, input("Cycle", status))
            .await
            .unwrap();
    }
    h.settle().await;

    assert_eq!(h.sink.delivered().len(), 2);
}

#[tokio::test]
async fn test_other_author_cannot_edit() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let jane = h.register("jane", Role::Author).await;
    let admin = h.admin().await;

    let post = h
        .service
        .create_post(&john, input("Mine", PostStatus::Draft))
        .await
        .unwrap();

    let err = h
        .service
        .update_post(&jane, &post.slug, input("Hijack", PostStatus::Published))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));

    let updated = h
        .service
        .update_post(&admin, &post.slug, input("Fixed typo", PostStatus::Draft))
        .await
        .unwrap();
    assert_eq!(updated.author_id, john.user_id);
    assert_eq!(updated.slug, post.slug);
}

#[tokio::test]
async fn test_category_management_by_role() {
    let h = Harness::new();
    let jane = h.register("jane", Role::Author).await;
    let bob = h.register("bob", Role::Reader).await;

    let tech = h
        .service
        .create_category(
            &jane,
            CategoryInput {
                name: "Tech".into(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(tech.slug, "tech");

    let err = h.service.delete_category(&bob, "tech").await.unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));

    let err = h
        .service
        .create_category(
            &jane,
            CategoryInput {
                name: " Tech ".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    h.service.delete_category(&jane, "tech").await.unwrap();
    assert!(h.service.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_deletion_rights() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let bob = h.register("bob", Role::Reader).await;
    let admin = h.admin().await;

    let post = h
        .service
        .create_post(&john, input("Open", PostStatus::Published))
        .await
        .unwrap();
    let first = h.service.add_comment(&bob, &post.slug, "Nice").await.unwrap();
    let second = h.service.add_comment(&bob, &post.slug, "Again").await.unwrap();

    let err = h.service.delete_comment(&john, first.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));

    h.service.delete_comment(&admin, first.id).await.unwrap();
    h.service.delete_comment(&bob, second.id).await.unwrap();

    let detail = h.service.post_detail(&post.slug, None).await.unwrap();
    assert!(detail.comments.is_empty());
}

#[tokio::test]
async fn test_cannot_comment_on_hidden_draft() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let bob = h.register("bob", Role::Reader).await;

    let post = h
        .service
        .create_post(&john, input("Secret", PostStatus::Draft))
        .await
        .unwrap();

    let err = h.service.add_comment(&bob, &post.slug, "Hi").await.unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));
    assert!(h.service.add_comment(&john, &post.slug, "Note").await.is_ok());
}

#[tokio::test]
async fn test_moderation_hides_comments() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let bob = h.register("bob", Role::Reader).await;
    let admin = h.admin().await;

    let post = h
        .service
        .create_post(&john, input("Moderated", PostStatus::Published))
        .await
        .unwrap();
    let comment = h.service.add_comment(&bob, &post.slug, "Spam").await.unwrap();

    let err = h
        .service
        .moderate_comments(&john, &[comment.id], false)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Denied(_)));

    let updated = h
        .service
        .moderate_comments(&admin, &[comment.id], false)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let detail = h.service.post_detail(&post.slug, None).await.unwrap();
    assert!(detail.comments.is_empty());
}

#[tokio::test]
async fn test_registration_rules() {
    let h = Harness::new();
    h.register("john", Role::Author).await;

    let duplicate = h
        .service
        .register(NewAccount {
            username: "john".into(),
            email: "other@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Reader,
        })
        .await;
    assert!(matches!(duplicate, Err(DomainError::Validation(_))));

    let admin = h
        .service
        .register(NewAccount {
            username: "mallory".into(),
            email: "mallory@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
        })
        .await;
    assert!(matches!(admin, Err(DomainError::Validation(_))));

    let (user, profile) = h
        .service
        .register(NewAccount {
            username: "carol".into(),
            email: "carol@example.com".into(),
            password_hash: "hash".into(),
            role: Role::default(),
        })
        .await
        .unwrap();
    assert_eq!(profile.user_id, user.id);
    assert_eq!(profile.role, Role::Reader);
}

#[tokio::test]
async fn test_profile_website_must_be_http() {
    let h = Harness::new();
    let bob = h.register("bob", Role::Reader).await;

    let err = h
        .service
        .update_profile(
            &bob,
            ProfileChanges {
                bio: "Hi".into(),
                avatar: None,
                website: Some("ftp://example.com".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let profile = h
        .service
        .update_profile(
            &bob,
            ProfileChanges {
                bio: "Hi".into(),
                avatar: None,
                website: Some("https://bob.dev".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.website.as_deref(), Some("https://bob.dev"));
    assert_eq!(profile.role, Role::Reader);

    let profile = h
        .service
        .update_profile(
            &bob,
            ProfileChanges {
                bio: "Hi".into(),
                avatar: None,
                website: Some("  https://bob.dev/blog  ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.website.as_deref(), Some("https://bob.dev/blog"));
}

#[tokio::test]
async fn test_readers_have_no_dashboard_or_authoring() {
    let h = Harness::new();
    let bob = h.register("bob", Role::Reader).await;

    assert!(matches!(
        h.service.dashboard(&bob).await,
        Err(DomainError::Denied(_))
    ));
    assert!(matches!(
        h.service
            .create_post(&bob, input("Nope", PostStatus::Draft))
            .await,
        Err(DomainError::Denied(_))
    ));
}

#[tokio::test]
async fn test_dashboard_lists_own_posts_in_every_status() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;
    let jane = h.register("jane", Role::Author).await;

    h.service
        .create_post(&john, input("One", PostStatus::Draft))
        .await
        .unwrap();
    h.service
        .create_post(&john, input("Two", PostStatus::Published))
        .await
        .unwrap();
    h.service
        .create_post(&jane, input("Three", PostStatus::Published))
        .await
        .unwrap();

    let mine = h.service.dashboard(&john).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|p| p.author_id == john.user_id));
}

#[tokio::test]
async fn test_slug_collisions_get_suffixes() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let post = h
            .service
            .create_post(&john, input("Hello World", PostStatus::Published))
            .await
            .unwrap();
        slugs.push(post.slug);
    }

    assert_eq!(slugs, vec!["hello-world", "hello-world-2", "hello-world-3"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_one_title_all_get_slugs() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = h.service.clone();
            let john = john.clone();
            tokio::spawn(async move {
                service
                    .create_post(&john, input("Same Title", PostStatus::Published))
                    .await
            })
        })
        .collect();

    let mut slugs = HashSet::new();
    for task in futures::future::join_all(tasks).await {
        let post = task.unwrap().unwrap();
        assert!(post.slug.starts_with("same-title"));
        slugs.insert(post.slug);
    }
    assert_eq!(slugs.len(), 8);
    assert!(slugs.contains("same-title"));
}

#[tokio::test]
async fn test_listing_hides_drafts_and_paginates() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    for i in 0..8 {
        h.service
            .create_post(&john, input(&format!("Post {i}"), PostStatus::Published))
            .await
            .unwrap();
    }
    h.service
        .create_post(&john, input("Hidden", PostStatus::Draft))
        .await
        .unwrap();

    let first = h.service.list_published(1).await.unwrap();
    assert_eq!(first.items.len(), 6);
    assert_eq!(first.total, 8);
    assert_eq!(first.total_pages(), 2);

    let second = h.service.list_published(2).await.unwrap();
    assert_eq!(second.items.len(), 2);
    assert!(second.items.iter().all(|p| p.is_published()));

    let far = h.service.list_published(u64::MAX).await.unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.total, 8);
}

#[tokio::test]
async fn test_search_and_tag_filters() {
    let h = Harness::new();
    let john = h.register("john", Role::Author).await;

    let rust = h.service.create_tag(&john, "Rust").await.unwrap();
    let mut tagged = input("Ownership explained", PostStatus::Published);
    tagged.tag_ids = vec![rust.id, rust.id];
    let post = h.service.create_post(&john, tagged).await.unwrap();
    assert_eq!(post.tag_ids, vec![rust.id]);

    h.service
        .create_post(&john, input("Gardening", PostStatus::Published))
        .await
        .unwrap();
    h.service
        .create_post(&john, input("Ownership drafts", PostStatus::Draft))
        .await
        .unwrap();

    let found = h.service.search("OWNERSHIP", 1).await.unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].id, post.id);

    assert_eq!(h.service.search("   ", 1).await.unwrap().total, 0);
    assert!(matches!(
        h.service.search(&"x".repeat(201), 1).await,
        Err(DomainError::Validation(_))
    ));

    let (tag, page) = h.service.posts_with_tag("rust", 1).await.unwrap();
    assert_eq!(tag.id, rust.id);
    assert_eq!(page.total, 1);

    h.service.delete_tag(&john, "rust").await.unwrap();
    let detail = h.service.post_detail(&post.slug, None).await.unwrap();
    assert!(detail.post.tag_ids.is_empty());
}

#[tokio::test]
async fn test_unknown_slugs_are_not_found() {
    let h = Harness::new();

    assert!(matches!(
        h.service.post_detail("missing", None).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.service.posts_in_category("missing", 1).await,
        Err(DomainError::NotFound { .. })
    ));
}
