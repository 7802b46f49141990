//! Inline HTML pages
//!
//! Minimal server-rendered pages for the account and gallery routes.
//! User-supplied strings are escaped before they reach markup.

use axum::response::Html;

use crate::db::ImageRecord;

pub fn register_page(message: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Register</h1>
{notice}
<form method="post" action="/register">
  <label>Username <input type="text" name="username"></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Register</button>
</form>
<p><a href="/login">Log in instead</a></p>"#,
        notice = notice_block(message),
    );
    Html(layout("Register", &body))
}

pub fn login_page(message: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Login</h1>
{notice}
<form method="post" action="/login">
  <label>Username <input type="text" name="username"></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Log in</button>
</form>
<p><a href="/register">Create an account</a></p>"#,
        notice = notice_block(message),
    );
    Html(layout("Login", &body))
}

pub fn profile_page(username: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Profile</h1>
<p>Logged in as <strong>{username}</strong></p>
<p><a href="/images">Your images</a> | <a href="/logout">Log out</a></p>"#,
        username = escape_html(username),
    );
    Html(layout("Profile", &body))
}

pub fn gallery_page(images: &[ImageRecord], notice: Option<&str>) -> Html<String> {
    let mut items = String::new();
    for image in images {
        items.push_str(&format!(
            r#"  <li>
    <a href="/images/{id}/file">{name}</a> <small>{created}</small>
    <form method="post" action="/images/{id}/delete"><button type="submit">Delete</button></form>
  </li>
"#,
            id = image.id,
            name = escape_html(&image.original_filename),
            created = escape_html(&image.created_at),
        ));
    }

    let listing = if images.is_empty() {
        "<p>No images yet.</p>".to_string()
    } else {
        format!("<ul>\n{}</ul>", items)
    };

    let body = format!(
        r#"<h1>Your images</h1>
{notice}
<form method="post" action="/images/upload" enctype="multipart/form-data">
  <input type="file" name="image">
  <button type="submit">Upload</button>
</form>
{listing}
<p><a href="/profile">Profile</a> | <a href="/logout">Log out</a></p>"#,
        notice = notice_block(notice),
    );
    Html(layout("Your images", &body))
}

fn notice_block(message: Option<&str>) -> String {
    match message {
        Some(text) => format!("<p class=\"notice\">{}</p>", escape_html(text)),
        None => String::new(),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{title} - pixelbin</title></head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
        body = body,
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<img src="x" onerror='pwn()'>&"#),
            "&lt;img src=&quot;x&quot; onerror=&#39;pwn()&#39;&gt;&amp;"
        );
    }

    #[test]
    fn test_gallery_escapes_original_filename() {
        let images = [ImageRecord {
            id: 1,
            owner_id: 1,
            original_filename: "<script>.png".to_string(),
            stored_filename: "leaf.png".to_string(),
            stored_path: PathBuf::from("/tmp/leaf.png"),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }];
        let Html(page) = gallery_page(&images, None);
        assert!(page.contains("&lt;script&gt;.png"));
        assert!(!page.contains("<script>.png"));
    }
}
