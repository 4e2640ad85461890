//! HTML page construction from structured data. Pure functions, no I/O.

use crate::listing::DirectoryListing;
use crate::nav::NavigationContext;

/// Escape HTML entities
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Percent-encode each segment of a slash-separated path, keeping the
/// slashes, so the result is safe in an href or a Location header.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/highlight.css\">\n\
         </head>\n<body>\n{body}</body>\n</html>\n",
        title = html_escape(title),
        body = body,
    )
}

fn entry_link(base: &str, name: &str, trailing_slash: bool) -> String {
    let target = if base == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", base, name)
    };
    let suffix = if trailing_slash { "/" } else { "" };

    format!(
        "<li><a href=\"{}\">{}{}</a></li>\n",
        encode_path(&target),
        html_escape(name),
        suffix,
    )
}

/// Listing page for a directory: subdirectories first, then files, both in
/// enumeration order.
pub fn directory_page(request_path: &str, listing: &DirectoryListing) -> String {
    let mut body = format!("<h1>{}</h1>\n", html_escape(request_path));

    if request_path != "/" {
        let parent = match request_path.rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((head, _)) => head.to_string(),
        };
        body.push_str(&format!(
            "<p><a href=\"{}\">..</a></p>\n",
            encode_path(&parent)
        ));
    }

    body.push_str("<ul>\n");
    for dir in &listing.dirs {
        body.push_str(&entry_link(request_path, dir, true));
    }
    for file in &listing.files {
        body.push_str(&entry_link(request_path, file, false));
    }
    body.push_str("</ul>\n");

    page_shell(request_path, &body)
}

/// Document page wrapping rendered markup, with an optional sibling
/// navigation bar.
pub fn document_page(title: &str, markup: &str, nav: Option<&NavigationContext>) -> String {
    let mut body = String::new();

    if let Some(nav) = nav {
        body.push_str(&format!(
            "<nav>\n\
             <a href=\"{previous}\">previous</a>\n\
             <a href=\"{parent}\">parent</a>\n\
             <a href=\"{next}\">next</a>\n\
             </nav>\n",
            previous = encode_path(&nav.previous),
            parent = encode_path(&nav.parent),
            next = encode_path(&nav.next),
        ));
    }

    body.push_str(markup);
    page_shell(title, &body)
}
