use crate::common::{MAX_UPLOAD_BYTES, MultipartForm, TestApp, jpeg_bytes, pdf_bytes, routes};
use uuid::Uuid;

mod upload_keys {
    use super::*;

    #[tokio::test]
    async fn photo_with_inspection_and_item_gets_nested_key() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme Inspections", "starter").await;

        let data = jpeg_bytes(2048);
        let form = MultipartForm::new()
            .text("inspectionId", "insp-42")
            .text("inspectionItemId", "item-7")
            .file("file", "roof.jpg", "image/jpeg", &data);

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);

        let key = res.body["fileKey"].as_str().unwrap();
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], "acme_inspections");
        assert_eq!(parts[1], "inspections");
        assert_eq!(parts[2], "insp-42");
        assert_eq!(parts[3], "photos");
        assert_eq!(parts[4], "item-7");
        assert!(parts[5].ends_with(".jpg"));
        assert!(Uuid::parse_str(parts[5].trim_end_matches(".jpg")).is_ok());

        let url = res.body["fileUrl"].as_str().unwrap();
        assert!(url.contains(key));
        assert!(url.ends_with("expires_in=300"));

        assert!(Uuid::parse_str(res.body["metadataId"].as_str().unwrap()).is_ok());

        // The blob landed in the store with the declared type.
        assert_eq!(app.store.object_bytes(key).await.unwrap(), data);
        assert_eq!(
            app.store.object_content_type(key).await.unwrap(),
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn photo_without_item_groups_under_general() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new()
            .text("inspectionId", "insp-42")
            .file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["fileKey"].as_str().unwrap();
        assert!(
            key.starts_with("acme/inspections/insp-42/photos/general/"),
            "unexpected key: {key}"
        );
    }

    #[tokio::test]
    async fn photo_without_inspection_lands_under_category() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().file("file", "logo.png", "image/png", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["fileKey"].as_str().unwrap();
        assert!(key.starts_with("acme/photo/"), "unexpected key: {key}");
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn report_key_has_no_item_segment() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        // An item id sent with a report is ignored by key derivation.
        let form = MultipartForm::new()
            .text("inspectionId", "insp-42")
            .text("inspectionItemId", "item-7")
            .file("file", "summary.pdf", "application/pdf", &pdf_bytes(256));

        let res = app
            .upload_with_token(&routes::upload("report"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["fileKey"].as_str().unwrap();
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[1], "inspections");
        assert_eq!(parts[3], "reports");
        assert!(parts[4].ends_with(".pdf"));
    }

    #[tokio::test]
    async fn blank_inspection_id_is_treated_as_absent() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new()
            .text("inspectionId", "   ")
            .file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["fileKey"].as_str().unwrap();
        assert!(key.starts_with("acme/photo/"), "unexpected key: {key}");
    }

    #[tokio::test]
    async fn same_file_name_twice_gets_distinct_keys() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let mut keys = Vec::new();
        for _ in 0..2 {
            let form = MultipartForm::new()
                .text("inspectionId", "insp-42")
                .file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));
            let res = app
                .upload_with_token(&routes::upload("photo"), form, &account.token)
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
            keys.push(res.body["fileKey"].as_str().unwrap().to_string());
        }

        assert_ne!(keys[0], keys[1]);
        assert_eq!(app.store.object_count().await, 2);
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_extension_guess() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().file_untyped("file", "photo.jpg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let key = res.body["fileKey"].as_str().unwrap();
        assert_eq!(
            app.store.object_content_type(key).await.unwrap(),
            "image/jpeg"
        );
    }
}

mod upload_validation {
    use super::*;

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().file("file", "clip.mp4", "video/mp4", b"data");

        let res = app
            .upload_with_token(&routes::upload("video"), form, &account.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(
            res.error(),
            "Invalid category 'video'. Valid values: photo, report"
        );
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().text("inspectionId", "insp-42");

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error(), "Missing 'file' field");
    }

    #[tokio::test]
    async fn wrong_mime_for_category_is_rejected() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().file("file", "doc.pdf", "application/pdf", &pdf_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert!(
            res.error().contains("not allowed for photo uploads"),
            "{}",
            res.text
        );
        // Nothing was written anywhere.
        assert_eq!(app.store.object_count().await, 0);
        assert_eq!(app.stored_file_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_inspection_id_is_rejected() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        // File first so the spool happens before the bad field is seen.
        let form = MultipartForm::new()
            .file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64))
            .text("inspectionId", "../../etc");

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(app.store.object_count().await, 0);
        assert_eq!(app.stored_file_count().await, 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        let too_big = usize::try_from(MAX_UPLOAD_BYTES).unwrap() + 1;
        let form = MultipartForm::new().file("file", "huge.jpg", "image/jpeg", &jpeg_bytes(too_big));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(
            res.error(),
            format!("File exceeds maximum size of {MAX_UPLOAD_BYTES} bytes")
        );
        assert_eq!(app.store.object_count().await, 0);
    }
}

mod upload_quota {
    use super::*;

    #[tokio::test]
    async fn upload_over_quota_is_denied() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        app.set_quota("starter", 5_000_000).await;
        app.set_usage(account.account_id, 4_900_000, 0, 41).await;

        let form =
            MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(120_000));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 403, "{}", res.text);
        assert_eq!(res.error(), "Storage quota exceeded");
        // A denied upload writes nothing.
        assert_eq!(app.store.object_count().await, 0);
        assert_eq!(app.stored_file_count().await, 0);
    }

    #[tokio::test]
    async fn upload_under_quota_is_admitted() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        app.set_quota("starter", 5_000_000).await;
        app.set_usage(account.account_id, 1_000_000, 0, 8).await;

        let form =
            MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(120_000));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(app.store.object_count().await, 1);
    }

    #[tokio::test]
    async fn upload_exactly_filling_quota_is_admitted() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        app.set_quota("starter", 5_000_000).await;
        app.set_usage(account.account_id, 4_880_000, 0, 40).await;

        let form =
            MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(120_000));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        // 4,880,000 + 120,000 lands exactly on the ceiling.
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn upload_one_byte_over_quota_is_denied() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;
        app.set_quota("starter", 5_000_000).await;
        app.set_usage(account.account_id, 4_880_001, 0, 40).await;

        let form =
            MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(120_000));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 403, "{}", res.text);
    }

    #[tokio::test]
    async fn unknown_tier_fails_closed() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "trial").await;

        let form = MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        // No quota row for the tier means no admission.
        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.error(), "Failed to check storage quota");
        assert_eq!(app.store.object_count().await, 0);
    }
}

mod upload_failures {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use common::storage::{BoxReader, ObjectStore, StorageError};
    use sea_orm::ConnectionTrait;

    /// Object store whose writes always fail, as if the backend were down.
    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put_stream(
            &self,
            _key: &str,
            _reader: BoxReader,
            _content_type: &str,
        ) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("injected write failure".into()))
        }

        async fn presign_get(&self, _key: &str, _expiry: u32) -> Result<String, StorageError> {
            Err(StorageError::Unavailable("injected presign failure".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("injected delete failure".into()))
        }

        async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable("injected head failure".into()))
        }

        fn bucket(&self) -> &str {
            "unreachable"
        }

        fn region(&self) -> &str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn store_failure_reports_unavailable_and_records_nothing() {
        let app = TestApp::spawn().await.with_store(Arc::new(FailingStore));
        let account = app.create_account("Acme", "starter").await;

        let form = MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.error(), "File storage is temporarily unavailable");
        // No metadata row for a blob that never landed.
        assert_eq!(app.stored_file_count().await, 0);
    }

    #[tokio::test]
    async fn metadata_failure_removes_the_blob() {
        let app = TestApp::spawn().await;
        let account = app.create_account("Acme", "starter").await;

        // Make the metadata insert fail while the store still works.
        app.db
            .execute_unprepared("ALTER TABLE stored_file RENAME TO stored_file_hidden")
            .await
            .unwrap();

        let form = MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &account.token)
            .await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.error(), "Failed to record file metadata");
        // The compensating delete took the orphaned blob back out.
        assert_eq!(app.store.object_count().await, 0);
    }
}

mod upload_auth {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};

    #[tokio::test]
    async fn upload_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let (content_type, body) = MultipartForm::new()
            .file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64))
            .finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(routes::upload("photo"))
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();

        let res = app.send(request).await;

        assert_eq!(res.status, 401, "{}", res.text);
        assert_eq!(res.error(), "Authentication required");
    }

    #[tokio::test]
    async fn valid_token_without_account_is_rejected() {
        let app = TestApp::spawn().await;
        // A signed token for a user no account row points at.
        let token = crate::common::token_for(Uuid::new_v4());

        let form = MultipartForm::new().file("file", "roof.jpg", "image/jpeg", &jpeg_bytes(64));

        let res = app
            .upload_with_token(&routes::upload("photo"), form, &token)
            .await;

        assert_eq!(res.status, 401, "{}", res.text);
        assert_eq!(res.error(), "No account associated with this user");
    }
}
