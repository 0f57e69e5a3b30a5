#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use crate::database::entity::{category, post, post_tag};
    use crate::database::postgres_repo::{PostgresCategoryRepository, PostgresPostRepository};
    use folio_core::domain::{Category, Post, PostStatus};
    use folio_core::error::RepoError;
    use folio_core::ports::{BaseRepository, CategoryRepository, PostRepository};

    fn post_model(id: Uuid, status: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            author_id: Uuid::new_v4(),
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            content: "Content".to_owned(),
            featured_image: None,
            status: status.to_owned(),
            category_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id_attaches_tags() {
        let post_id = Uuid::new_v4();
        let tag_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, "published")]])
            .append_query_results([vec![post_tag::Model { post_id, tag_id }]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(post.id, post_id);
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.tag_ids, vec![tag_id]);
    }

    #[tokio::test]
    async fn test_missing_post_skips_tag_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        assert!(repo.find_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_stored_status_is_a_query_error() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, "archived")]])
            .append_query_results([Vec::<post_tag::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let result = repo.find_by_id(post_id).await;
        assert!(matches!(result, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn test_status_update_reports_stored_status_and_keeps_identity() {
        let post_id = Uuid::new_v4();
        let stored = post_model(post_id, "draft");
        let updated = post::Model {
            title: "Edited".to_owned(),
            status: "published".to_owned(),
            ..stored.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![stored.clone()]])
                .append_query_results([vec![updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let repo = PostgresPostRepository::new(db.clone());

        let mut edit = Post::new(
            Uuid::new_v4(),
            "Edited".to_owned(),
            "renamed-slug".to_owned(),
            "Content".to_owned(),
            PostStatus::Published,
        );
        edit.id = post_id;

        let saved = repo.update_tracking_status(edit).await.unwrap();
        assert_eq!(saved.previous_status, PostStatus::Draft);
        assert_eq!(saved.post.status, PostStatus::Published);
        assert_eq!(saved.post.author_id, stored.author_id);
        assert_eq!(saved.post.slug, "test-post");

        drop(repo);
        let log = Arc::into_inner(db).unwrap().into_transaction_log();
        let statements: Vec<_> = log.iter().flat_map(|t| t.statements()).collect();

        assert_eq!(statements[0].sql, "BEGIN");
        assert!(
            statements
                .iter()
                .any(|s| s.sql.starts_with("SELECT") && s.sql.contains("FOR UPDATE"))
        );
        let update = statements
            .iter()
            .find(|s| s.sql.starts_with("UPDATE"))
            .expect("update statement");
        let values = &update.values.as_ref().unwrap().0;
        assert!(values.contains(&Value::Uuid(Some(Box::new(stored.author_id)))));
        assert!(values.contains(&Value::String(Some(Box::new("test-post".to_owned())))));
        assert!(!values.contains(&Value::String(Some(Box::new("renamed-slug".to_owned())))));
        assert_eq!(statements.last().unwrap().sql, "COMMIT");
    }

    #[tokio::test]
    async fn test_status_update_of_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let post = Post::new(
            Uuid::new_v4(),
            "Gone".to_owned(),
            "gone".to_owned(),
            "Content".to_owned(),
            PostStatus::Published,
        );

        let result = repo.update_tracking_status(post).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_category_by_slug() {
        let id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category::Model {
                id,
                name: "Tech".to_owned(),
                slug: "tech".to_owned(),
                description: None,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));

        let category: Category = repo.find_by_slug("tech").await.unwrap().unwrap();
        assert_eq!(category.id, id);
        assert_eq!(category.name, "Tech");
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));

        let result = BaseRepository::<Category, Uuid>::delete(&repo, Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
