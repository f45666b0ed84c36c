mod common;

use axum::http::StatusCode;
use common::{
    app, get, group, group_post, multipart_body, post, post_form, post_multipart, state, user,
    FilePart, SMALL_GIF,
};
use yatube::{
    comments, feed::{self, FeedScope}, follows,
    posts::{store, NewPost},
};

#[tokio::test]
async fn public_pages_render() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let diary = group(&state.db_pool, "Diary", "diary").await;
    let entry = group_post(&state.db_pool, &author, &diary, "Dear diary").await;
    let app = app(state, None);

    for uri in [
        "/".to_owned(),
        "/group/diary/".to_owned(),
        "/profile/auth/".to_owned(),
        format!("/posts/{}/", entry.id),
        "/about/author/".to_owned(),
        "/about/tech/".to_owned(),
    ] {
        let response = get(&app, &uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
    }

    let group_page = get(&app, "/group/diary/").await;
    assert!(group_page.body.contains("Dear diary"));
    assert!(group_page.body.contains("Test description"));
}

#[tokio::test]
async fn unknown_objects_are_not_found() {
    let state = state().await;
    let app = app(state, None);

    for uri in [
        "/group/nope/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/abc/",
        "/posts/99999999999999999999/",
        "/unexisting_page/",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert!(response.body.contains("not found"), "{uri}");
    }
}

#[tokio::test]
async fn protected_pages_send_anonymous_visitors_to_login() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let entry = post(&state.db_pool, &author, "text").await;
    let app = app(state, None);

    let cases = [
        ("/create/".to_owned(), "/auth/login/?next=%2Fcreate%2F".to_owned()),
        ("/follow/".to_owned(), "/auth/login/?next=%2Ffollow%2F".to_owned()),
        (
            format!("/posts/{}/edit/", entry.id),
            format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", entry.id),
        ),
        (
            "/profile/auth/follow/".to_owned(),
            "/auth/login/?next=%2Fprofile%2Fauth%2Ffollow%2F".to_owned(),
        ),
        (
            "/profile/auth/unfollow/".to_owned(),
            "/auth/login/?next=%2Fprofile%2Fauth%2Funfollow%2F".to_owned(),
        ),
    ];
    for (uri, login) in cases {
        let response = get(&app, &uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.location.as_deref(), Some(login.as_str()));
    }

    let comment = post_form(&app, &format!("/posts/{}/comment/", entry.id), "text=hi").await;
    assert_eq!(comment.status, StatusCode::SEE_OTHER);
    assert!(comment.location.unwrap().starts_with("/auth/login/?next="));
}

#[tokio::test]
async fn index_serves_a_cached_snapshot() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    post(&state.db_pool, &author, "old news").await;
    let app = app(state.clone(), None);

    let before = get(&app, "/").await;
    assert!(before.body.contains("old news"));

    sqlx::query("DELETE FROM posts")
        .execute(&state.db_pool)
        .await
        .unwrap();
    let cached = get(&app, "/").await;
    assert_eq!(cached.body, before.body);

    state.feed_cache.invalidate_all();
    let refreshed = get(&app, "/").await;
    assert_ne!(refreshed.body, before.body);
    assert!(!refreshed.body.contains("old news"));
    assert!(refreshed.body.contains("No posts yet."));
}

#[tokio::test]
async fn cached_index_pages_are_keyed_by_page_number() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    for i in 0..13 {
        post(&state.db_pool, &author, &format!("entry number {i}")).await;
    }
    let app = app(state, None);

    let first = get(&app, "/").await;
    let second = get(&app, "/?page=2").await;
    assert!(first.body.contains("entry number 12"));
    assert!(!first.body.contains("entry number 0<"));
    assert!(second.body.contains("entry number 0"));
    assert!(!second.body.contains("entry number 12"));
}

#[tokio::test]
async fn author_creates_post_with_group_and_image() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let diary = group(&state.db_pool, "Diary", "diary").await;
    let app = app(state.clone(), Some(author.id));

    let form = get(&app, "/create/").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains(r#"<option value="1">Diary</option>"#));

    let group_id = diary.id.to_string();
    let body = multipart_body(
        &[("text", "Brand new post"), ("group", &group_id)],
        Some(FilePart {
            name: "image",
            file_name: "small.gif",
            content_type: "image/gif",
            bytes: SMALL_GIF,
        }),
    );
    let response = post_multipart(&app, "/create/", body).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/profile/auth/"));

    let page = feed::page(&state.db_pool, FeedScope::Group(diary.id), None, 10)
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    let created = &page.object_list[0];
    assert_eq!(created.text, "Brand new post");
    assert_eq!(created.author_id, author.id);

    let image = created.image.as_deref().unwrap();
    assert!(image.starts_with("posts/"));
    let stored = tokio::fs::read(state.config.media_root.join(image)).await.unwrap();
    assert_eq!(stored, SMALL_GIF);

    let _ = tokio::fs::remove_dir_all(&state.config.media_root).await;
}

#[tokio::test]
async fn invalid_post_form_is_shown_again() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let app = app(state.clone(), Some(author.id));

    let blank = post_multipart(&app, "/create/", multipart_body(&[("text", "   ")], None)).await;
    assert_eq!(blank.status, StatusCode::OK);
    assert!(blank.body.contains("This field is required."));

    let unknown_group = post_multipart(
        &app,
        "/create/",
        multipart_body(&[("text", "fine"), ("group", "42")], None),
    )
    .await;
    assert_eq!(unknown_group.status, StatusCode::OK);
    assert!(unknown_group.body.contains("Select a valid choice."));

    let not_an_image = post_multipart(
        &app,
        "/create/",
        multipart_body(
            &[("text", "fine")],
            Some(FilePart {
                name: "image",
                file_name: "notes.txt",
                content_type: "text/plain",
                bytes: b"just text",
            }),
        ),
    )
    .await;
    assert_eq!(not_an_image.status, StatusCode::OK);
    assert!(not_an_image.body.contains("Upload a valid image."));

    assert_eq!(feed::count(&state.db_pool, FeedScope::Global).await.unwrap(), 0);
}

async fn fail_writes_to_posts(db_pool: &sqlx::SqlitePool) {
    for statement in [
        "CREATE TRIGGER refuse_post_insert BEFORE INSERT ON posts BEGIN SELECT RAISE(ABORT, 'read only'); END",
        "CREATE TRIGGER refuse_post_update BEFORE UPDATE ON posts BEGIN SELECT RAISE(ABORT, 'read only'); END",
    ] {
        sqlx::query(statement).execute(db_pool).await.unwrap();
    }
}

fn stored_uploads(media_root: &std::path::Path) -> usize {
    std::fs::read_dir(media_root.join("posts")).map_or(0, |entries| entries.count())
}

fn gif_part() -> FilePart<'static> {
    FilePart {
        name: "image",
        file_name: "small.gif",
        content_type: "image/gif",
        bytes: SMALL_GIF,
    }
}

#[tokio::test]
async fn failed_post_write_leaves_no_upload_behind() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let entry = post(&state.db_pool, &author, "original").await;
    fail_writes_to_posts(&state.db_pool).await;
    let app = app(state.clone(), Some(author.id));

    let created = post_multipart(
        &app,
        "/create/",
        multipart_body(&[("text", "with picture")], Some(gif_part())),
    )
    .await;
    assert_eq!(created.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stored_uploads(&state.config.media_root), 0);

    let edited = post_multipart(
        &app,
        &format!("/posts/{}/edit/", entry.id),
        multipart_body(&[("text", "with picture")], Some(gif_part())),
    )
    .await;
    assert_eq!(edited.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stored_uploads(&state.config.media_root), 0);

    let _ = tokio::fs::remove_dir_all(&state.config.media_root).await;
}

#[tokio::test]
async fn only_the_author_can_edit() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let intruder = user(&state.db_pool, "intruder").await;
    let entry = store::create(
        &state.db_pool,
        NewPost {
            image: Some("posts/old.gif".to_owned()),
            ..NewPost::text(author.id, "original")
        },
    )
    .await
    .unwrap();
    let edit_uri = format!("/posts/{}/edit/", entry.id);
    let detail_uri = format!("/posts/{}/", entry.id);

    let intruder_app = app(state.clone(), Some(intruder.id));
    let form = get(&intruder_app, &edit_uri).await;
    assert_eq!(form.status, StatusCode::SEE_OTHER);
    assert_eq!(form.location.as_deref(), Some(detail_uri.as_str()));

    let attempt = post_multipart(&intruder_app, &edit_uri, multipart_body(&[("text", "hacked")], None)).await;
    assert_eq!(attempt.location.as_deref(), Some(detail_uri.as_str()));
    assert_eq!(store::get(&state.db_pool, entry.id).await.unwrap().text, "original");

    let author_app = app(state.clone(), Some(author.id));
    let form = get(&author_app, &edit_uri).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("original"));

    let saved = post_multipart(&author_app, &edit_uri, multipart_body(&[("text", "edited")], None)).await;
    assert_eq!(saved.status, StatusCode::SEE_OTHER);
    assert_eq!(saved.location.as_deref(), Some(detail_uri.as_str()));

    let edited = store::get(&state.db_pool, entry.id).await.unwrap();
    assert_eq!(edited.text, "edited");
    assert_eq!(edited.author_id, author.id);
    assert_eq!(edited.pub_date, entry.pub_date);
    assert_eq!(edited.image.as_deref(), Some("posts/old.gif"));
}

#[tokio::test]
async fn edit_link_is_shown_to_the_author_only() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let reader = user(&state.db_pool, "reader").await;
    let entry = post(&state.db_pool, &author, "text").await;
    let uri = format!("/posts/{}/", entry.id);
    let edit_link = format!("/posts/{}/edit/", entry.id);

    let as_author = get(&app(state.clone(), Some(author.id)), &uri).await;
    assert!(as_author.body.contains(&edit_link));

    let as_reader = get(&app(state.clone(), Some(reader.id)), &uri).await;
    assert!(!as_reader.body.contains(&edit_link));

    let anonymous = get(&app(state, None), &uri).await;
    assert!(!anonymous.body.contains(&edit_link));
}

#[tokio::test]
async fn comments_are_added_and_listed() {
    let state = state().await;
    let author = user(&state.db_pool, "auth").await;
    let reader = user(&state.db_pool, "reader").await;
    let entry = post(&state.db_pool, &author, "text").await;
    let app = app(state.clone(), Some(reader.id));
    let comment_uri = format!("/posts/{}/comment/", entry.id);
    let detail_uri = format!("/posts/{}/", entry.id);

    let added = post_form(&app, &comment_uri, "text=Nice+post").await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location.as_deref(), Some(detail_uri.as_str()));

    let blank = post_form(&app, &comment_uri, "text=+++").await;
    assert_eq!(blank.location.as_deref(), Some(detail_uri.as_str()));

    let stored = comments::for_post(&state.db_pool, entry.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text, "Nice post");
    assert_eq!(stored[0].author_id, reader.id);

    let detail = get(&app, &detail_uri).await;
    assert!(detail.body.contains("Nice post"));

    let missing = post_form(&app, "/posts/999/comment/", "text=hello").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn following_through_the_profile() {
    let state = state().await;
    let reader = user(&state.db_pool, "reader").await;
    let author = user(&state.db_pool, "author").await;
    post(&state.db_pool, &author, "worth following").await;
    let app = app(state.clone(), Some(reader.id));

    let profile = get(&app, "/profile/author/").await;
    assert!(profile.body.contains("/profile/author/follow/"));

    let followed = get(&app, "/profile/author/follow/").await;
    assert_eq!(followed.status, StatusCode::SEE_OTHER);
    assert_eq!(followed.location.as_deref(), Some("/profile/author/"));
    assert!(follows::is_following(&state.db_pool, reader.id, author.id).await.unwrap());

    let again = get(&app, "/profile/author/follow/").await;
    assert_eq!(again.location.as_deref(), Some("/profile/author/"));
    assert_eq!(follows::follower_count(&state.db_pool, author.id).await.unwrap(), 1);

    let profile = get(&app, "/profile/author/").await;
    assert!(profile.body.contains("/profile/author/unfollow/"));

    let feed = get(&app, "/follow/").await;
    assert_eq!(feed.status, StatusCode::OK);
    assert!(feed.body.contains("worth following"));

    let unfollowed = get(&app, "/profile/author/unfollow/").await;
    assert_eq!(unfollowed.status, StatusCode::SEE_OTHER);
    assert_eq!(unfollowed.location.as_deref(), Some("/follow/"));
    assert!(!follows::is_following(&state.db_pool, reader.id, author.id).await.unwrap());

    let feed = get(&app, "/follow/").await;
    assert!(!feed.body.contains("worth following"));

    let unknown = get(&app, "/profile/nobody/follow/").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn following_yourself_changes_nothing() {
    let state = state().await;
    let author = user(&state.db_pool, "author").await;
    let app = app(state.clone(), Some(author.id));

    let profile = get(&app, "/profile/author/").await;
    assert!(!profile.body.contains("/profile/author/follow/"));

    let response = get(&app, "/profile/author/follow/").await;
    assert_eq!(response.location.as_deref(), Some("/profile/author/"));
    assert_eq!(follows::follower_count(&state.db_pool, author.id).await.unwrap(), 0);
}
