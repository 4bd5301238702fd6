//! Askama templates.
//!
//! Every page extends `base.html`; the feed pages share the post list
//! and paginator includes. Template structs own their data so handlers
//! can hand them straight to the renderer.

use askama::Template;
use axum::response::Html;
use quill_common::AppError;
use quill_core::{CommentView, Page, PostDetail, PostView};
use quill_db::entities::{group, user};

use crate::error::PageResult;

/// Render a template into an HTML response body.
pub fn render<T: Template>(template: &T) -> PageResult<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Template(e.to_string()).into())
}

/// Global index feed.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
    /// Requested feed page.
    pub page: Page<PostView>,
}

/// A group's feed.
#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
    /// The resolved group.
    pub group: group::Model,
    /// Requested feed page.
    pub page: Page<PostView>,
}

/// An author's profile feed.
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
    /// The profile's author.
    pub author: user::Model,
    /// Whether the viewer already follows the author.
    pub following: bool,
    /// Requested feed page.
    pub page: Page<PostView>,
}

/// The viewer's aggregated follow feed.
#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    /// The signed-in viewer.
    pub viewer: Option<user::Model>,
    /// Requested feed page.
    pub page: Page<PostView>,
}

/// A single post with its comments.
#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
    /// The post, its author and group.
    pub detail: PostDetail,
    /// Comments, newest first.
    pub comments: Vec<CommentView>,
    /// Validation message for a rejected comment submission.
    pub comment_error: Option<String>,
}

/// A group entry in the post form's selector.
#[derive(Debug, Clone)]
pub struct GroupOption {
    /// Group ID, the option value.
    pub id: String,
    /// Group title, the option label.
    pub title: String,
    /// Whether this option is preselected.
    pub selected: bool,
}

/// Build the post form's group selector options.
#[must_use]
pub fn group_options(groups: Vec<group::Model>, selected: Option<&str>) -> Vec<GroupOption> {
    groups
        .into_iter()
        .map(|g| GroupOption {
            selected: selected == Some(g.id.as_str()),
            id: g.id,
            title: g.title,
        })
        .collect()
}

/// The create/edit post form.
#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    /// The signed-in viewer.
    pub viewer: Option<user::Model>,
    /// Page heading.
    pub heading: String,
    /// Form action path.
    pub action: String,
    /// Current text, echoed back on validation failure.
    pub text: String,
    /// Group selector options.
    pub groups: Vec<GroupOption>,
    /// Validation messages, empty on first render.
    pub errors: Vec<String>,
}

/// Custom not-found page.
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate;

/// Generic error page.
#[derive(Template)]
#[template(path = "500.html")]
pub struct ServerErrorTemplate;

/// Static page about the author.
#[derive(Template)]
#[template(path = "about_author.html")]
pub struct AboutAuthorTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
}

/// Static page about the stack.
#[derive(Template)]
#[template(path = "about_tech.html")]
pub struct AboutTechTemplate {
    /// Signed-in viewer, if any.
    pub viewer: Option<user::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_group(id: &str, title: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: title.to_string(),
            slug: title.to_lowercase(),
            description: String::new(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_group_options_marks_selection() {
        let options = group_options(
            vec![test_group("g1", "Cats"), test_group("g2", "Dogs")],
            Some("g2"),
        );

        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_not_found_template_renders() {
        let html = NotFoundTemplate.render().unwrap();
        assert!(html.contains("404"));
    }

    #[test]
    fn test_index_template_renders_posts() {
        use quill_db::entities::post;

        let author = user::Model {
            id: "u1".to_string(),
            username: "leo".to_string(),
            username_lower: "leo".to_string(),
            display_name: Some("Leo".to_string()),
            bio: None,
            token: None,
            created_at: Utc::now().into(),
        };
        let view = PostView {
            post: post::Model {
                id: "p1".to_string(),
                author_id: "u1".to_string(),
                group_id: None,
                text: "Hello world".to_string(),
                image: None,
                created_at: Utc::now().into(),
            },
            author: author.clone(),
            group: None,
        };

        let html = IndexTemplate {
            viewer: None,
            page: Page::new(vec![view], 1, 1),
        }
        .render()
        .unwrap();

        assert!(html.contains("Hello world"));
        assert!(html.contains("/profile/leo/"));
        assert!(html.contains("Leo"));
    }
}
