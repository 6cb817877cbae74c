//! Askama templates for the server-rendered pages.

use askama::Template;

use crate::users::dto::PublicUser;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub logged_in: bool,
    pub first_name: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
}

/// Admin user list; never holds password data.
#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub viewer: String,
    pub users: Vec<PublicUser>,
}
