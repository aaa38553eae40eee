/// Page view-models and their HTML rendering
use crate::{api::flash::Flash, record_store::UserRecord};
use serde::Serialize;

const NAV_TITLE: &str = "Profile System";

/// Everything a page needs besides its body
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub title: &'static str,
    pub navtitle: &'static str,
    pub message: Option<Flash>,
}

impl PageMeta {
    fn new(title: &'static str, message: Option<Flash>) -> Self {
        Self {
            title,
            navtitle: NAV_TITLE,
            message,
        }
    }
}

/// `GET /`
#[derive(Debug, Serialize)]
pub struct ListView {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub users: Vec<UserRecord>,
}

/// `GET /add`
#[derive(Debug, Serialize)]
pub struct AddView {
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// `GET /edit/:id`
#[derive(Debug, Serialize)]
pub struct EditView {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub user: UserRecord,
}

impl ListView {
    pub fn new(users: Vec<UserRecord>, message: Option<Flash>) -> Self {
        Self {
            meta: PageMeta::new("All Users", message),
            users,
        }
    }

    pub fn render(&self) -> String {
        let body = if self.users.is_empty() {
            "<p class=\"empty\">No users found.</p>".to_string()
        } else {
            let rows: String = self.users.iter().map(user_row).collect();
            format!(
                "<table>\n<thead><tr><th>Image</th><th>Name</th><th>Email</th><th>Phone</th><th>Action</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>",
                rows
            )
        };
        layout(&self.meta, &body)
    }
}

impl AddView {
    pub fn new(message: Option<Flash>) -> Self {
        Self {
            meta: PageMeta::new("Add Users", message),
        }
    }

    pub fn render(&self) -> String {
        let form = format!(
            "<form action=\"/add\" method=\"post\" enctype=\"multipart/form-data\">\n{}<label>Image <input type=\"file\" name=\"image\" required></label>\n<button type=\"submit\">Add User</button>\n</form>",
            text_inputs(None)
        );
        layout(&self.meta, &form)
    }
}

impl EditView {
    pub fn new(user: UserRecord, message: Option<Flash>) -> Self {
        Self {
            meta: PageMeta::new("Edit User", message),
            user,
        }
    }

    pub fn render(&self) -> String {
        let user = &self.user;
        let form = format!(
            "<form action=\"/update/{id}\" method=\"post\" enctype=\"multipart/form-data\">\n{inputs}<label>Image <input type=\"file\" name=\"image\"></label>\n<img src=\"{src}\" width=\"100\" alt=\"\">\n<input type=\"hidden\" name=\"old_image\" value=\"{old}\">\n<button type=\"submit\">Update User</button>\n</form>",
            id = urlencoding::encode(&user.id),
            inputs = text_inputs(Some(user)),
            src = upload_url(&user.image),
            old = escape(&user.image),
        );
        layout(&self.meta, &form)
    }
}

fn user_row(user: &UserRecord) -> String {
    let id = urlencoding::encode(&user.id);
    format!(
        "<tr><td><img src=\"{src}\" width=\"50\" alt=\"\"></td><td>{name}</td><td>{email}</td><td>{phone}</td><td><a href=\"/edit/{id}\">Edit</a> <a href=\"/delete/{id}\">Delete</a></td></tr>\n",
        src = upload_url(&user.image),
        name = escape(&user.name),
        email = escape(&user.email),
        phone = escape(&user.phone),
        id = id,
    )
}

fn text_inputs(user: Option<&UserRecord>) -> String {
    let (name, email, phone) = match user {
        Some(u) => (escape(&u.name), escape(&u.email), escape(&u.phone)),
        None => Default::default(),
    };
    format!(
        "<label>Name <input type=\"text\" name=\"name\" value=\"{}\" required></label>\n<label>Email <input type=\"email\" name=\"email\" value=\"{}\" required></label>\n<label>Phone <input type=\"tel\" name=\"phone\" value=\"{}\" required></label>\n",
        name, email, phone,
    )
}

fn layout(meta: &PageMeta, body: &str) -> String {
    let alert = meta
        .message
        .as_ref()
        .map(|m| {
            format!(
                "<div class=\"alert alert-{}\" role=\"alert\">{}</div>\n",
                m.kind.as_str(),
                escape(&m.message)
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<nav><a href=\"/\">{nav}</a> <a href=\"/add\">Add User</a></nav>\n<main>\n<h1>{title}</h1>\n{alert}{body}\n</main>\n</body>\n</html>\n",
        title = escape(meta.title),
        nav = escape(meta.navtitle),
        alert = alert,
        body = body,
    )
}

/// Public path of a stored image
pub fn upload_url(stored_name: &str) -> String {
    format!("/uploads/{}", urlencoding::encode(stored_name))
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
