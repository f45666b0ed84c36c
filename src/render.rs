//! HTML assembly for the embedded pages under `res/pages`.

use pulldown_cmark::{Event, Options, Parser};
use time::{OffsetDateTime, macros::format_description};

use crate::{feed::PostCard, include_res, paginate::Page, res::fill};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text written by users: escaped, with line breaks kept.
pub fn linebreaks(raw: &str) -> String {
    escape(raw.trim_end()).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Renders trusted Markdown such as the about pages. Raw HTML in the
/// source is shown as text.
pub fn markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_MATH)
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

pub fn date(at: OffsetDateTime) -> String {
    at.format(format_description!("[day].[month].[year] [hour]:[minute]"))
        .unwrap_or_else(|_| at.to_string())
}

pub fn layout(title: &str, content: &str) -> String {
    fill(
        include_res!(str, "/pages/base.html"),
        &[("title", &escape(title)), ("content", content)],
    )
}

pub fn not_found(what: &str) -> String {
    layout(
        "Page not found",
        &fill(
            include_res!(str, "/pages/not_found.html"),
            &[("what", &escape(what))],
        ),
    )
}

pub fn internal_error() -> String {
    layout("Server error", include_res!(str, "/pages/error.html"))
}

pub fn post_card(post: &PostCard) -> String {
    let group = match (&post.group_slug, &post.group_title) {
        (Some(slug), Some(title)) => format!(
            r#"<a href="/group/{}/">all posts of group {}</a>"#,
            escape(slug),
            escape(title)
        ),
        _ => String::new(),
    };

    fill(
        include_res!(str, "/pages/posts/post_card.html"),
        &[
            ("id", &post.id.to_string()),
            ("author_username", &escape(&post.author_username)),
            ("author_name", &escape(&post.author_name())),
            ("pub_date", &date(post.pub_date)),
            ("image", &image(post.image.as_deref())),
            ("text", &linebreaks(&post.text)),
            ("group", &group),
        ],
    )
}

pub fn image(path: Option<&str>) -> String {
    path.map(|path| format!(r#"<img class="post-image" src="/media/{}" alt="">"#, escape(path)))
        .unwrap_or_default()
}

/// Cards of one page followed by the page navigation.
pub fn post_list(page: &Page<PostCard>) -> String {
    let mut posts = String::new();
    for post in page.iter() {
        posts += &post_card(post);
    }
    if page.is_empty() {
        posts += "<p>No posts yet.</p>";
    }

    posts + &paginator(page)
}

pub fn paginator<T>(page: &Page<T>) -> String {
    if page.num_pages <= 1 {
        return String::new();
    }

    let mut links = Vec::new();
    if let Some(previous) = page.previous_page_number() {
        links.push(r#"<a href="?page=1">first</a>"#.to_owned());
        links.push(format!(r#"<a href="?page={previous}">previous</a>"#));
    }
    links.push(format!(
        "<span>Page {} of {}</span>",
        page.number, page.num_pages
    ));
    if let Some(next) = page.next_page_number() {
        links.push(format!(r#"<a href="?page={next}">next</a>"#));
        links.push(format!(r#"<a href="?page={}">last</a>"#, page.num_pages));
    }

    format!(r#"<nav class="paginator">{}</nav>"#, links.join(" "))
}
