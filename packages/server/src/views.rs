//! Server-rendered HTML pages.
//!
//! Every dynamic value goes through `html_escape` before it is interpolated.

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::entity::file;
use crate::extractors::auth::AuthUser;
use crate::flash::Flash;

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem}.flash{padding:.6rem 1rem;margin:.5rem 0;border-radius:4px}\
.success{background:#e6f4ea}.info{background:#e8f0fe}.warning{background:#fef7e0}\
.danger{background:#fce8e6}pre{white-space:pre-wrap;background:#f6f8fa;padding:1rem}\
label{display:block;margin-top:.8rem}";

fn layout(title: &str, user: Option<&AuthUser>, flashes: &[Flash], body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            "<a href=\"/dashboard\">Dashboard</a><a href=\"/upload\">Upload</a>\
             <a href=\"/logout\">Log out</a><span>Signed in as {}</span>",
            text(&user.name)
        ),
        None => "<a href=\"/\">Home</a><a href=\"/login\">Log in</a>\
                 <a href=\"/register\">Register</a>"
            .to_string(),
    };

    let notices: String = flashes
        .iter()
        .map(|f| {
            format!(
                "<div class=\"flash {}\">{}</div>",
                f.level.as_str(),
                text(&f.message)
            )
        })
        .collect();

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} - PDF Desk</title><style>{STYLE}</style></head>\
         <body><nav>{nav}</nav>{notices}<main>{body}</main></body></html>",
        text(title)
    ))
}

pub fn home(user: Option<&AuthUser>, flashes: &[Flash]) -> Html<String> {
    let cta = if user.is_some() {
        "<p><a href=\"/upload\">Upload a PDF</a> or go to your <a href=\"/dashboard\">dashboard</a>.</p>"
    } else {
        "<p><a href=\"/register\">Create an account</a> or <a href=\"/login\">log in</a> to get started.</p>"
    };
    let body = format!(
        "<h1>PDF Desk</h1><p>Upload PDF documents and read back their text.</p>{cta}"
    );
    layout("Home", user, flashes, &body)
}

pub fn register(flashes: &[Flash]) -> Html<String> {
    let body = "<h1>Create an account</h1>\
        <form method=\"post\" action=\"/register\">\
        <label>Name <input name=\"name\" required maxlength=\"100\"></label>\
        <label>Email <input type=\"email\" name=\"email\" required maxlength=\"100\"></label>\
        <label>Password <input type=\"password\" name=\"password\" required minlength=\"6\"></label>\
        <p><button type=\"submit\">Register</button></p></form>\
        <p>Already registered? <a href=\"/login\">Log in</a>.</p>";
    layout("Register", None, flashes, body)
}

pub fn login(flashes: &[Flash]) -> Html<String> {
    let body = "<h1>Log in</h1>\
        <form method=\"post\" action=\"/login\">\
        <label>Email <input type=\"email\" name=\"email\" required></label>\
        <label>Password <input type=\"password\" name=\"password\" required></label>\
        <p><button type=\"submit\">Log in</button></p></form>\
        <p>No account yet? <a href=\"/register\">Register</a>.</p>";
    layout("Log in", None, flashes, body)
}

pub fn dashboard(user: &AuthUser, flashes: &[Flash], files: &[file::Model]) -> Html<String> {
    let listing = if files.is_empty() {
        "<p>You have not uploaded any files yet.</p>".to_string()
    } else {
        let rows: String = files
            .iter()
            .map(|f| {
                format!(
                    "<li><a href=\"/extract_text?file_id={}\">{}</a> <small>{}</small></li>",
                    f.id,
                    text(&f.filename),
                    f.created_at.format("%Y-%m-%d %H:%M UTC")
                )
            })
            .collect();
        format!("<ul>{rows}</ul>")
    };

    let body = format!(
        "<h1>Welcome, {}</h1><p><a href=\"/upload\">Upload a new PDF</a></p>\
         <h2>Your files</h2>{listing}",
        text(&user.name)
    );
    layout("Dashboard", Some(user), flashes, &body)
}

pub fn upload(user: &AuthUser, flashes: &[Flash], max_size: u64) -> Html<String> {
    let body = format!(
        "<h1>Upload a PDF</h1>\
         <form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
         <label>PDF file <input type=\"file\" name=\"pdf_file\" accept=\".pdf,application/pdf\" required></label>\
         <p><small>Maximum size: {} MB</small></p>\
         <p><button type=\"submit\">Upload</button></p></form>",
        max_size / (1024 * 1024)
    );
    layout("Upload", Some(user), flashes, &body)
}

pub fn extracted_text(
    user: &AuthUser,
    flashes: &[Flash],
    file: &file::Model,
    content: &str,
) -> Html<String> {
    let body = format!(
        "<h1>{}</h1><p><small>Uploaded {}</small></p>\
         <form method=\"post\" action=\"/extract_text\">\
         <input type=\"hidden\" name=\"file_id\" value=\"{}\">\
         <button type=\"submit\">Reload text</button></form>\
         <pre>{}</pre><p><a href=\"/dashboard\">Back to dashboard</a></p>",
        text(&file.filename),
        file.created_at.format("%Y-%m-%d %H:%M UTC"),
        attr(&file.id.to_string()),
        text(content)
    );
    layout(&file.filename, Some(user), flashes, &body)
}
