use crate::common::{TestApp, routes};
use common::storage::FileCategory;

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_blob_and_row() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        let key = "acme/photo/old.jpg";
        app.seed_file(account.account_id, key, FileCategory::Photo, 64)
            .await;

        let res = app
            .delete_with_token(&routes::delete(key), &account.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["message"].as_str().unwrap(),
            "File deleted successfully"
        );
        assert_eq!(app.store.object_count().await, 0);
        assert_eq!(app.stored_file_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let res = app
            .delete_with_token(&routes::delete("acme/photo/missing.jpg"), &account.token)
            .await;

        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.error(), "File not found");
    }

    #[tokio::test]
    async fn foreign_file_is_forbidden_and_untouched() {
        let app = TestApp::spawn().await;
        let owner = app.create_account("Acme", "starter").await;
        let intruder = app.create_account("Rival Co", "starter").await;

        let key = "acme/photo/keep.jpg";
        app.seed_file(owner.account_id, key, FileCategory::Photo, 64)
            .await;

        let res = app
            .delete_with_token(&routes::delete(key), &intruder.token)
            .await;

        assert_eq!(res.status, 403, "{}", res.text);
        // Both the blob and the metadata row survive the attempt.
        assert!(app.store.object_bytes(key).await.is_some());
        assert_eq!(app.stored_file_count().await, 1);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        let key = "acme/photo/once.jpg";
        app.seed_file(account.account_id, key, FileCategory::Photo, 64)
            .await;

        let first = app
            .delete_with_token(&routes::delete(key), &account.token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);

        let second = app
            .delete_with_token(&routes::delete(key), &account.token)
            .await;
        assert_eq!(second.status, 404, "{}", second.text);
    }

    #[tokio::test]
    async fn row_without_blob_still_deletes() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        // Metadata row whose object is already gone from the store.
        let key = "acme/photo/ghost.jpg";
        app.seed_file_row(account.account_id, key, FileCategory::Photo, 64)
            .await;

        let res = app
            .delete_with_token(&routes::delete(key), &account.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.stored_file_count().await, 0);
    }
}
