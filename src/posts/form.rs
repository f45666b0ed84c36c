//! Post and comment forms: parsing, validation and the HTML of the post form.

use std::path::Path;

use axum::{body::Bytes, extract::Multipart};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{
    db::Group,
    groups, include_res,
    render::{self, escape},
    res::fill,
    AppResult,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Messages per form field, in the order they were found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    fn render(&self, field: &str) -> String {
        let items: String = self
            .field(field)
            .map(|message| format!("<li>{}</li>", escape(message)))
            .collect();
        if items.is_empty() {
            String::new()
        } else {
            format!(r#"<ul class="errorlist">{items}</ul>"#)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageKind {
    /// Recognizes an image by its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(b"\xFF\xD8\xFF") {
            Some(ImageKind::Jpeg)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Gif => "gif",
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Webp => "webp",
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("The submitted file is empty.")]
    Empty,
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    NotAnImage,
    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn kind(&self) -> Result<ImageKind, UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if let Some(content_type) = &self.content_type {
            if !content_type.starts_with("image/") {
                return Err(UploadError::NotAnImage);
            }
        }
        ImageKind::sniff(&self.bytes).ok_or(UploadError::NotAnImage)
    }

    /// Writes the image under `media_root/posts/` with a fresh name and
    /// returns its path relative to `media_root`.
    pub async fn save(&self, media_root: &Path) -> Result<String, UploadError> {
        let kind = self.kind()?;
        let relative = format!("posts/{}.{}", Uuid::now_v7().simple(), kind.extension());
        let path = media_root.join(&relative);

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, &self.bytes).await?;

        Ok(relative)
    }
}

/// Removes a saved upload whose post never made it into the database.
pub async fn discard(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        warn!("could not remove orphaned upload {relative}: {e}");
    }
}

/// Raw values of the post form as submitted.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    pub group: String,
    pub image: Option<Upload>,
}

impl PostForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = PostForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "text" => form.text = field.text().await?,
                "group" => form.group = field.text().await?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    // browsers send an empty part when no file was picked
                    if !(bytes.is_empty() && file_name.is_empty()) {
                        form.image = Some(Upload {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn group_id(&self) -> Option<i64> {
        self.group.trim().parse().ok()
    }

    pub async fn validate(&self, db_pool: &SqlitePool) -> sqlx::Result<FormErrors> {
        let mut errors = FormErrors::default();

        if self.text().is_empty() {
            errors.add("text", REQUIRED);
        }

        if !self.group.trim().is_empty() {
            let known = match self.group_id() {
                Some(id) => groups::exists(db_pool, id).await?,
                None => false,
            };
            if !known {
                errors.add("group", INVALID_CHOICE);
            }
        }

        if let Some(Err(e)) = self.image.as_ref().map(Upload::kind) {
            errors.add("image", e.to_string());
        }

        Ok(errors)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<&str, FormErrors> {
        let text = self.text.trim();
        if text.is_empty() {
            let mut errors = FormErrors::default();
            errors.add("text", REQUIRED);
            return Err(errors);
        }
        Ok(text)
    }
}

pub struct FormPage<'a> {
    pub heading: &'a str,
    pub action: &'a str,
    pub button: &'a str,
    pub form: &'a PostForm,
    pub errors: &'a FormErrors,
    pub groups: &'a [Group],
    pub current_image: Option<&'a str>,
}

pub fn render_post_form(page: FormPage<'_>) -> String {
    let selected = page.form.group_id();
    let group_options: String = page
        .groups
        .iter()
        .map(|group| {
            format!(
                r#"        <option value="{}"{}>{}</option>"#,
                group.id,
                if selected == Some(group.id) { " selected" } else { "" },
                escape(&group.title)
            ) + "\n"
        })
        .collect();

    let errors = if page.errors.is_empty() {
        String::new()
    } else {
        r#"<p class="errornote">Please correct the errors below.</p>"#.to_owned()
    };

    let body = fill(
        include_res!(str, "/pages/posts/post_form.html"),
        &[
            ("heading", &escape(page.heading)),
            ("action", &escape(page.action)),
            ("button", &escape(page.button)),
            ("errors", &errors),
            ("text", &escape(&page.form.text)),
            ("text_errors", &page.errors.render("text")),
            ("group_options", &group_options),
            ("group_errors", &page.errors.render("group")),
            ("current_image", &render::image(page.current_image)),
            ("image_errors", &page.errors.render("image")),
        ],
    );

    render::layout(page.heading, &body)
}
