use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use sqlx::SqlitePool;
use studyhub::modules::storage::{BlobStore, LocalBlobStore};
use studyhub::utils::resources::models::{NewResource, ResourceType, UploadedFile};
use studyhub::utils::resources::{add_resource, errors::ResourceError, group_resources};


fn note(title: &str) -> NewResource {
    NewResource {
        title: title.into(),
        resource_type: ResourceType::Note,
        description: "Short summary".into(),
        link: None,
        file: None,
    }
}

fn store() -> LocalBlobStore {
    LocalBlobStore::new(
        std::env::temp_dir().join(format!("studyhub-blobs-{}", uuid::Uuid::new_v4().simple())),
        "/media",
    )
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn add_note_health_check(db: SqlitePool) {
    let blobs = store();
    add_resource(&db, &blobs, 1, 2, note("  Chain rule cheatsheet ")).await.unwrap();

    let resources = group_resources(&db, 1).await.unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].title, "Chain rule cheatsheet");
    assert_eq!(resources[0].uploader, "bob");
    assert_eq!(resources[0].resource_type, ResourceType::Note);
    assert!(resources[0].file.is_none());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn non_member_cannot_add(db: SqlitePool) {
    let res = add_resource(&db, &store(), 1, 4, note("Spam")).await;

    match res {
        Err(ResourceError::NotAMember) => (),
        _ => panic!("Test result is {:?}", res),
    }
    assert!(group_resources(&db, 1).await.unwrap().is_empty());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn link_must_be_a_url(db: SqlitePool) {
    let resource = NewResource {
        resource_type: ResourceType::Link,
        link: Some("not a url".into()),
        ..note("Lecture notes")
    };
    let res = add_resource(&db, &store(), 1, 1, resource).await;

    match res {
        Err(ResourceError::InvalidResource(_)) => (),
        _ => panic!("Test result is {:?}", res),
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn script_links_are_rejected(db: SqlitePool) {
    for link in [
        "javascript:fetch('/group/1/message/send/')",
        "data:text/html,<script>alert(1)</script>",
    ] {
        let resource = NewResource {
            resource_type: ResourceType::Link,
            link: Some(link.into()),
            ..note("Totally safe link")
        };
        let res = add_resource(&db, &store(), 1, 1, resource).await;

        match res {
            Err(ResourceError::InvalidResource(_)) => (),
            _ => panic!("Test result is {:?}", res),
        }
    }

    let resource = NewResource {
        resource_type: ResourceType::Link,
        link: Some("https://example.com/limits.pdf".into()),
        ..note("Limits handout")
    };
    add_resource(&db, &store(), 1, 1, resource).await.unwrap();

    let resources = group_resources(&db, 1).await.unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].link.as_deref(), Some("https://example.com/limits.pdf"));
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn script_link_through_http_is_not_rendered(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;
    let client = app_data.client_as(1, "alice");

    let form = Form::new()
        .text("title", "Click me")
        .text("resource_type", "link")
        .text("link", "javascript:alert(document.cookie)");

    let res = client
        .post(app_data.url("/group/1/resource/add/"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(group_resources(&db, 1).await.unwrap().is_empty());

    let page = client
        .get(app_data.url("/group/1/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!page.contains("javascript:"));
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn uploaded_file_is_stored(db: SqlitePool) {
    let blobs = store();
    let resource = NewResource {
        resource_type: ResourceType::Document,
        file: Some(UploadedFile {
            file_name: "../notes.txt".into(),
            bytes: b"integrals".to_vec(),
        }),
        ..note("Notes")
    };
    add_resource(&db, &blobs, 1, 1, resource).await.unwrap();

    let resources = group_resources(&db, 1).await.unwrap();
    let key = resources[0].file.clone().unwrap();
    assert!(key.starts_with("resources/"));
    assert!(key.ends_with("notes.txt"));
    assert!(!key.contains(".."));

    assert_eq!(blobs.get(&key).await.unwrap().as_deref(), Some(&b"integrals"[..]));
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn upload_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;

    let form = Form::new()
        .text("title", "Problem set 1")
        .text("resource_type", "document")
        .text("description", "")
        .text("link", "")
        .part(
            "file",
            Part::bytes(b"1 + 1 = 2".to_vec()).file_name("set1.txt"),
        );

    let res = app_data
        .client_as(1, "alice")
        .post(app_data.url("/group/1/resource/add/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/group/1/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("Resource added successfully!")
    );

    let resources = group_resources(&db, 1).await.unwrap();
    assert_eq!(resources.len(), 1);
    let key = resources[0].file.clone().unwrap();
    assert!(app_data.media_root().join(&key).exists());

    let res = app_data
        .client()
        .get(app_data.url(&format!("/media/{key}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "1 + 1 = 2");
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn upload_by_outsider_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;

    let form = Form::new()
        .text("title", "Spam")
        .text("resource_type", "note");

    let res = app_data
        .client_as(4, "dave")
        .post(app_data.url("/group/1/resource/add/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("You must be a member to add resources.")
    );
    assert!(group_resources(&db, 1).await.unwrap().is_empty());
}
