use axum::{
    debug_handler,
    extract::State,
    response::Html,
};
use sqlx::SqlitePool;

use crate::{
    auth::Viewer,
    comments::{self, CommentCard},
    feed, include_res,
    posts::PostId,
    render::{self, escape},
    res::fill,
    users, AppError, AppResult,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_detail(
    PostId(post_id): PostId,
    State(db_pool): State<SqlitePool>,
    Viewer(viewer): Viewer,
) -> AppResult<Html<String>> {
    let post = feed::card(&db_pool, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    let author_post_count = users::post_count(&db_pool, post.author_id).await?;
    let comments = comments::for_post(&db_pool, post.id).await?;

    let group = match (&post.group_slug, &post.group_title) {
        (Some(slug), Some(title)) => format!(
            r#"<li>Group: <a href="/group/{}/">{}</a></li>"#,
            escape(slug),
            escape(title)
        ),
        _ => String::new(),
    };
    let edit = match viewer {
        Some(user) if user.id == post.author_id => {
            format!(r#"<a class="edit" href="/posts/{}/edit/">Edit post</a>"#, post.id)
        }
        _ => String::new(),
    };

    let body = fill(
        include_res!(str, "/pages/posts/post_detail.html"),
        &[
            ("pub_date", &render::date(post.pub_date)),
            ("group", &group),
            ("author_username", &escape(&post.author_username)),
            ("author_name", &escape(&post.author_name())),
            ("author_post_count", &author_post_count.to_string()),
            ("image", &render::image(post.image.as_deref())),
            ("text", &render::linebreaks(&post.text)),
            ("edit", &edit),
            ("id", &post.id.to_string()),
            ("comments", &comment_list(&comments)),
        ],
    );

    let title: String = post.text.chars().take(30).collect();
    Ok(Html(render::layout(&format!("Post {title}"), &body)))
}

fn comment_list(comments: &[CommentCard]) -> String {
    comments
        .iter()
        .map(|comment| {
            fill(
                include_res!(str, "/pages/posts/comment.html"),
                &[
                    ("author_username", &escape(&comment.author_username)),
                    ("author_name", &escape(&comment.author_name())),
                    ("created", &render::date(comment.created)),
                    ("text", &render::linebreaks(&comment.text)),
                ],
            )
        })
        .collect()
}
