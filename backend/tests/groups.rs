use reqwest::StatusCode;
use sqlx::SqlitePool;
use studyhub::utils::groups::models::{BrowseFilter, NewGroup};
use studyhub::utils::groups::{
    browse_groups, check_if_group_member, create_group, delete_group, errors::GroupError,
    featured_groups, get_group, list_subjects, query_user_groups, try_join_group, try_leave_group,
};


fn new_group(name: &str, max_members: i64) -> NewGroup {
    NewGroup {
        name: name.into(),
        subject: "Biology".into(),
        description: "Cells and more cells".into(),
        max_members,
        is_private: false,
    }
}

#[sqlx::test(fixtures("users"))]
async fn create_group_makes_creator_a_member(db: SqlitePool) {
    let group_id = create_group(&db, new_group("  Cell Club  ", 10), 4).await.unwrap();

    let group = get_group(&db, group_id).await.unwrap();
    assert_eq!(group.name, "Cell Club");
    assert_eq!(group.created_by, 4);
    assert_eq!(group.member_count, 1);
    assert!(check_if_group_member(&db, 4, group_id).await.unwrap());
}

#[sqlx::test(fixtures("users"))]
async fn create_group_validates_capacity(db: SqlitePool) {
    for max_members in [1, 101] {
        let res = create_group(&db, new_group("Cell Club", max_members), 4).await;
        match res {
            Err(GroupError::InvalidGroup(_)) => (),
            _ => panic!("Test result is {:?}", res),
        }
    }

    assert!(create_group(&db, new_group("Pair", 2), 4).await.is_ok());
    assert!(create_group(&db, new_group("Crowd", 100), 4).await.is_ok());
}

#[sqlx::test(fixtures("users"))]
async fn create_group_requires_name(db: SqlitePool) {
    let res = create_group(&db, new_group("   ", 10), 4).await;
    match res {
        Err(GroupError::InvalidGroup(_)) => (),
        _ => panic!("Test result is {:?}", res),
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_group_health_check(db: SqlitePool) {
    // carol joins Calculus Crew, taking the last seat
    try_join_group(&db, 3, 1).await.unwrap();

    assert!(check_if_group_member(&db, 3, 1).await.unwrap());
    assert_eq!(get_group(&db, 1).await.unwrap().member_count, 3);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_group_twice(db: SqlitePool) {
    let res = try_join_group(&db, 2, 1).await;

    match res {
        Err(GroupError::AlreadyMember) => (),
        _ => panic!("Test result is {:?}", res),
    }
    assert_eq!(get_group(&db, 1).await.unwrap().member_count, 2);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_full_group(db: SqlitePool) {
    // Physics Pals holds 2 and has 2
    let res = try_join_group(&db, 1, 2).await;

    match res {
        Err(GroupError::GroupFull) => (),
        _ => panic!("Test result is {:?}", res),
    }
    assert!(!check_if_group_member(&db, 1, 2).await.unwrap());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn member_of_full_group_is_told_it_is_full(db: SqlitePool) {
    // capacity is checked before membership
    let res = try_join_group(&db, 2, 2).await;

    match res {
        Err(GroupError::GroupFull) => (),
        _ => panic!("Test result is {:?}", res),
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_group_that_does_not_exist(db: SqlitePool) {
    let res = try_join_group(&db, 1, 99).await;

    match res {
        Err(GroupError::GroupDoesNotExist) => (),
        _ => panic!("Test result is {:?}", res),
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn creator_cannot_leave(db: SqlitePool) {
    let res = try_leave_group(&db, 1, 1).await;

    match res {
        Err(GroupError::CreatorCannotLeave) => (),
        _ => panic!("Test result is {:?}", res),
    }
    assert!(check_if_group_member(&db, 1, 1).await.unwrap());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn non_member_cannot_leave(db: SqlitePool) {
    let res = try_leave_group(&db, 4, 1).await;

    match res {
        Err(GroupError::NotAMember) => (),
        _ => panic!("Test result is {:?}", res),
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn leave_group_health_check(db: SqlitePool) {
    try_leave_group(&db, 2, 1).await.unwrap();

    assert!(!check_if_group_member(&db, 2, 1).await.unwrap());
    assert_eq!(get_group(&db, 1).await.unwrap().member_count, 1);
}

async fn count_rows(db: &SqlitePool, table: &str, group_id: i64) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE group_id = ?"))
        .bind(group_id)
        .fetch_one(db)
        .await
        .unwrap();
    count
}

const CHILD_TABLES: [&str; 4] = ["group_members", "resources", "messages", "study_sessions"];

#[sqlx::test(fixtures("users", "groups", "group_members", "messages", "sessions", "resources"))]
async fn delete_group_is_creator_only(db: SqlitePool) {
    let res = delete_group(&db, 2, 1).await;
    match res {
        Err(GroupError::NotTheCreator) => (),
        _ => panic!("Test result is {:?}", res),
    }
    for table in CHILD_TABLES {
        assert!(count_rows(&db, table, 1).await > 0, "{table} lost rows");
    }

    let files = delete_group(&db, 1, 1).await.unwrap();
    assert_eq!(files, ["resources/0a1b2c-examples.pdf"]);
    assert!(matches!(
        get_group(&db, 1).await,
        Err(GroupError::GroupDoesNotExist)
    ));

    for table in CHILD_TABLES {
        assert_eq!(count_rows(&db, table, 1).await, 0, "{table} still has rows");
    }

    // other groups keep their children
    assert_eq!(count_rows(&db, "resources", 2).await, 1);
    assert_eq!(count_rows(&db, "messages", 2).await, 1);
    assert_eq!(count_rows(&db, "group_members", 2).await, 2);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn delete_through_http_removes_files(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;
    let client = app_data.client_as(1, "alice");

    let form = reqwest::multipart::Form::new()
        .text("title", "Past paper")
        .text("resource_type", "document")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"Q1. Differentiate x^2".to_vec()).file_name("paper.txt"),
        );
    let res = client
        .post(app_data.url("/group/1/resource/add/"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let (key,): (String,) = sqlx::query_as("SELECT file FROM resources WHERE group_id = 1")
        .fetch_one(&db)
        .await
        .unwrap();
    let path = app_data.media_root().join(&key);
    assert!(path.exists());

    let res = app_data
        .client_as(2, "bob")
        .post(app_data.url("/group/1/delete/"))
        .send()
        .await
        .unwrap();
    assert_eq!(tools::location(&res), "/group/1/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("Only the group creator can delete the group.")
    );
    assert!(path.exists());

    let res = client
        .post(app_data.url("/group/1/delete/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/dashboard/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("Calculus Crew was deleted.")
    );

    assert!(!path.exists());
    for table in CHILD_TABLES {
        assert_eq!(count_rows(&db, table, 1).await, 0, "{table} still has rows");
    }
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn featured_groups_skip_private_ones(db: SqlitePool) {
    let groups = featured_groups(&db, 6).await.unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();

    assert_eq!(
        names,
        ["Organic Chemistry 100%", "Physics Pals", "Calculus Crew"]
    );

    let groups = featured_groups(&db, 1).await.unwrap();
    assert_eq!(groups.len(), 1);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn browse_filters(db: SqlitePool) {
    let by_text = browse_groups(
        &db,
        &BrowseFilter {
            q: Some("DERIVATIVES".into()),
            subject: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].name, "Calculus Crew");

    let by_subject = browse_groups(
        &db,
        &BrowseFilter {
            q: None,
            subject: Some("phys".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(by_subject.len(), 1);
    assert_eq!(by_subject[0].name, "Physics Pals");

    let private = browse_groups(
        &db,
        &BrowseFilter {
            q: Some("Secret".into()),
            subject: None,
        },
    )
    .await
    .unwrap();
    assert!(private.is_empty());

    let literal_percent = browse_groups(
        &db,
        &BrowseFilter {
            q: Some("100%".into()),
            subject: Some("  ".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(literal_percent.len(), 1);
    assert_eq!(literal_percent[0].name, "Organic Chemistry 100%");

    let everything = browse_groups(&db, &BrowseFilter::default()).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[sqlx::test(fixtures("users"))]
async fn browse_folds_ascii_case_only(db: SqlitePool) {
    let group = NewGroup {
        subject: "Física".into(),
        ..new_group("Mecánica Cuántica", 10)
    };
    create_group(&db, group, 4).await.unwrap();

    let search = |q: &str| BrowseFilter {
        q: Some(q.into()),
        subject: None,
    };

    assert_eq!(browse_groups(&db, &search("cuántica")).await.unwrap().len(), 1);
    assert_eq!(browse_groups(&db, &search("MECáNICA")).await.unwrap().len(), 1);
    assert!(browse_groups(&db, &search("MECÁNICA")).await.unwrap().is_empty());
}

#[sqlx::test(fixtures("users", "groups"))]
async fn subjects_are_distinct_and_sorted(db: SqlitePool) {
    let subjects = list_subjects(&db).await.unwrap();
    assert_eq!(subjects, ["Chemistry", "History", "Mathematics", "Physics"]);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn user_groups_split_joined_and_created(db: SqlitePool) {
    let groups = query_user_groups(&db, 2).await.unwrap();

    let joined: Vec<i64> = groups.joined.iter().map(|g| g.id).collect();
    let created: Vec<i64> = groups.created.iter().map(|g| g.id).collect();
    assert_eq!(joined, [2, 1]);
    assert_eq!(created, [2]);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;
    let client = app_data.client_as(3, "carol");

    let res = client
        .post(app_data.url("/group/1/join/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/group/1/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("You joined Calculus Crew!")
    );
    assert!(check_if_group_member(&db, 3, 1).await.unwrap());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_full_group_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;
    let client = app_data.client_as(1, "alice");

    let res = client
        .post(app_data.url("/group/2/join/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/group/2/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("This group is full.")
    );
    assert!(!check_if_group_member(&db, 1, 2).await.unwrap());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn join_missing_group_is_not_found(db: SqlitePool) {
    let app_data = tools::AppData::new(db).await;
    let client = app_data.client_as(1, "alice");

    let res = client
        .post(app_data.url("/group/99/join/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn leave_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;

    let res = app_data
        .client_as(2, "bob")
        .post(app_data.url("/group/1/leave/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/dashboard/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("You left Calculus Crew.")
    );

    let res = app_data
        .client_as(1, "alice")
        .post(app_data.url("/group/1/leave/"))
        .send()
        .await
        .unwrap();
    assert_eq!(tools::location(&res), "/group/1/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("Group creator cannot leave. Delete the group instead.")
    );
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn private_group_hidden_from_outsiders(db: SqlitePool) {
    let app_data = tools::AppData::new(db).await;

    let res = app_data
        .client_as(2, "bob")
        .get(app_data.url("/group/3/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/browse/");
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("This is a private group.")
    );

    let res = app_data
        .client_as(1, "alice")
        .get(app_data.url("/group/3/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Secret Society"));
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn group_page_requires_login(db: SqlitePool) {
    let app_data = tools::AppData::new(db).await;

    let res = app_data
        .client()
        .get(app_data.url("/group/1/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(tools::location(&res), "/auth/login");
}

#[sqlx::test(fixtures("users"))]
async fn create_group_through_http(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;
    let client = app_data.client_as(4, "dave");

    let res = client
        .post(app_data.url("/create/"))
        .form(&[
            ("name", "Cell Club"),
            ("subject", "Biology"),
            ("description", ""),
            ("max_members", "12"),
            ("is_private", "on"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        tools::flash_message(&res).as_deref(),
        Some("Study group created successfully!")
    );

    let groups = query_user_groups(&db, 4).await.unwrap();
    assert_eq!(groups.created.len(), 1);
    let group = &groups.created[0];
    assert!(group.is_private);
    assert_eq!(group.max_members, 12);
    assert_eq!(tools::location(&res), format!("/group/{}/", group.id));
}

#[sqlx::test(fixtures("users"))]
async fn create_group_with_bad_capacity_rerenders_form(db: SqlitePool) {
    let app_data = tools::AppData::new(db.clone()).await;

    let res = app_data
        .client_as(4, "dave")
        .post(app_data.url("/create/"))
        .form(&[("name", "Crowd"), ("subject", "Biology"), ("max_members", "500")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("max members"));
    assert!(query_user_groups(&db, 4).await.unwrap().created.is_empty());
}

#[sqlx::test(fixtures("users", "groups", "group_members"))]
async fn browse_page_lists_public_groups(db: SqlitePool) {
    let app_data = tools::AppData::new(db).await;

    let res = app_data
        .client()
        .get(app_data.url("/browse/?q=calc&subject="))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("Calculus Crew"));
    assert!(!body.contains("Physics Pals"));
    assert!(!body.contains("Secret Society"));
}
