use anyhow::Context;
use askama::Template;
use axum::response::Html;

use crate::error::AppError;

pub mod handlers;
pub mod templates;

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    let body = template.render().context("render template")?;
    Ok(Html(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::templates::{AdminUsersTemplate, HomeTemplate};

    #[test]
    fn home_shows_login_state() {
        let Html(anon) = render(&HomeTemplate {
            logged_in: false,
            first_name: None,
        })
        .unwrap();
        assert!(anon.contains("href=\"/login\""));

        let Html(known) = render(&HomeTemplate {
            logged_in: true,
            first_name: Some("Ada".into()),
        })
        .unwrap();
        assert!(known.contains("Ada"));
        assert!(known.contains("href=\"/dashboard\""));
    }

    #[test]
    fn user_fields_are_escaped() {
        let Html(page) = render(&AdminUsersTemplate {
            viewer: "<script>".into(),
            users: vec![],
        })
        .unwrap();
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
