//! Post pages: detail, create, edit, comment.

use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use quill_common::AppError;
use quill_core::{NewComment, NewPost, UpdatePost};
use serde::Deserialize;

use crate::error::PageResult;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::state::AppState;
use crate::templates::{PostDetailTemplate, PostFormTemplate, group_options, render};

/// The post create/edit form body.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    /// Post text.
    pub text: String,
    /// Selected group ID; the empty option arrives as "".
    pub group_id: Option<String>,
    /// Image path from the media pipeline, if one was attached.
    pub image: Option<String>,
}

impl PostForm {
    /// Empty select options and absent uploads arrive as empty strings.
    fn normalized(self) -> (String, Option<String>, Option<String>) {
        let group_id = self.group_id.filter(|s| !s.is_empty());
        let image = self.image.filter(|s| !s.is_empty());
        (self.text, group_id, image)
    }
}

/// The comment form body.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    /// Comment text.
    pub text: String,
}

/// `GET /posts/{id}/` — a single post with its comments.
pub async fn detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> PageResult<Html<String>> {
    let detail = state.post_service.detail(&id).await?;
    let comments = state.comment_service.for_post(&id).await?;

    render(&PostDetailTemplate {
        viewer,
        detail,
        comments,
        comment_error: None,
    })
}

/// `GET /create/` — the new post form.
pub async fn create_form(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
) -> PageResult<Html<String>> {
    let groups = state.group_service.list().await?;

    render(&PostFormTemplate {
        viewer: Some(viewer),
        heading: "New post".to_string(),
        action: "/create/".to_string(),
        text: String::new(),
        groups: group_options(groups, None),
        errors: Vec::new(),
    })
}

/// `POST /create/` — create a post.
///
/// On success, redirects to the author's profile. A validation failure
/// re-renders the form with the messages, HTTP 200.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Form(form): Form<PostForm>,
) -> PageResult<Response> {
    let (text, group_id, image) = form.normalized();
    let input = NewPost {
        text: text.clone(),
        group_id: group_id.clone(),
        image,
    };

    match state.post_service.create(&viewer, input).await {
        Ok(_) => Ok(Redirect::to(&format!("/profile/{}/", viewer.username)).into_response()),
        Err(AppError::Validation(message)) => {
            let groups = state.group_service.list().await?;
            let html = render(&PostFormTemplate {
                viewer: Some(viewer),
                heading: "New post".to_string(),
                action: "/create/".to_string(),
                text,
                groups: group_options(groups, group_id.as_deref()),
                errors: validation_messages(&message),
            })?;
            Ok(html.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /posts/{id}/edit/` — the edit form.
///
/// Non-authors are sent back to the post detail page.
pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<String>,
) -> PageResult<Response> {
    match state.post_service.for_edit(&viewer.id, &id).await {
        Ok(post) => {
            let groups = state.group_service.list().await?;
            let html = render(&PostFormTemplate {
                viewer: Some(viewer),
                heading: "Edit post".to_string(),
                action: format!("/posts/{id}/edit/"),
                text: post.text,
                groups: group_options(groups, post.group_id.as_deref()),
                errors: Vec::new(),
            })?;
            Ok(html.into_response())
        }
        Err(AppError::Forbidden(_)) => {
            Ok(Redirect::to(&format!("/posts/{id}/")).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /posts/{id}/edit/` — update a post (author only).
pub async fn edit(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> PageResult<Response> {
    let (text, group_id, image) = form.normalized();
    let input = UpdatePost {
        text: text.clone(),
        group_id: group_id.clone(),
        image,
    };

    match state.post_service.update(&viewer.id, &id, input).await {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}/", post.id)).into_response()),
        Err(AppError::Forbidden(_)) => {
            Ok(Redirect::to(&format!("/posts/{id}/")).into_response())
        }
        Err(AppError::Validation(message)) => {
            let groups = state.group_service.list().await?;
            let html = render(&PostFormTemplate {
                viewer: Some(viewer),
                heading: "Edit post".to_string(),
                action: format!("/posts/{id}/edit/"),
                text,
                groups: group_options(groups, group_id.as_deref()),
                errors: validation_messages(&message),
            })?;
            Ok(html.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /posts/{id}/comment/` — add a comment.
///
/// On success, redirects back to the post. A validation failure
/// re-renders the detail page with the message, HTTP 200.
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> PageResult<Response> {
    let input = NewComment { text: form.text };

    match state.comment_service.add(&viewer, &id, input).await {
        Ok(_) => Ok(Redirect::to(&format!("/posts/{id}/")).into_response()),
        Err(AppError::Validation(message)) => {
            let detail = state.post_service.detail(&id).await?;
            let comments = state.comment_service.for_post(&id).await?;
            let html = render(&PostDetailTemplate {
                viewer: Some(viewer),
                detail,
                comments,
                comment_error: Some(message),
            })?;
            Ok(html.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Split a `validator` message blob into per-field lines.
fn validation_messages(message: &str) -> Vec<String> {
    message
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
