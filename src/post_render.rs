use std::io;
use std::io::ErrorKind;

use lazy_static::lazy_static;
use markdown::Options;
use regex::{Captures, Regex};

use crate::post::Post;

/// Full article body rendered to HTML, with post-relative images pointed
/// at the post's asset route.
pub fn render_post_html(post: &Post) -> io::Result<String> {
    let img_prefix = format!("/view/{}", post.link);
    render_markdown(&post.body, Some(&img_prefix))
}

/// The part of the body above the preview break, for listing cards.
pub fn render_preview_html(post: &Post) -> io::Result<String> {
    let img_prefix = format!("/view/{}", post.link);
    render_markdown(post.preview(), Some(&img_prefix))
}

pub struct RenderedPage {
    pub title: String,
    pub html: String,
}

/// Markdown pages (about, services, ...) are a `# Title` line followed by
/// the body.
pub fn render_page(raw: &str) -> io::Result<RenderedPage> {
    let mut title = String::new();
    let mut body = String::new();
    let mut in_body = false;

    for line in raw.lines() {
        if !in_body {
            if let Some(rest) = line.trim().strip_prefix("# ") {
                title = rest.to_string();
                in_body = true;
            }
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    if title.is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidData, "Page has no title heading"));
    }

    let html = render_markdown(&body, None)?;
    Ok(RenderedPage { title, html })
}

fn render_markdown(md_text: &str, img_prefix: Option<&str>) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    let buf = match img_prefix {
        Some(prefix) => prefix_images(prefix, &buf),
        None => buf,
    };

    match markdown::to_html_with_options(buf.as_str(), &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
    }
}

/// Strip `<!-- ... -->` blocks. An opened comment that never closes is a
/// broken source file.
fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res = String::with_capacity(md_post.len());
    let mut rest = md_post;

    while let Some(start) = rest.find("<!--") {
        res.push_str(&rest[..start]);
        let after_open = &rest[start + "<!--".len()..];
        match after_open.find("-->") {
            Some(end) => rest = &after_open[end + "-->".len()..],
            None => {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "Error finding end of comment",
                ));
            }
        }
    }

    res.push_str(rest);
    Ok(res)
}

// Images written relative to the post directory get the route prefix;
// absolute links are left alone.
fn prefix_images(prefix: &str, md_post: &str) -> String {
    lazy_static! {
        static ref IMAGE_REGEX: Regex = Regex::new(
            r"!\[(?P<alt>[^\]]*)\]\((?P<url>[^)]+)\)"
        ).unwrap();
    }

    let prefix = prefix.trim_end_matches('/');
    IMAGE_REGEX.replace_all(md_post, |caps: &Captures| {
        let url = &caps["url"];
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/') {
            caps[0].to_string()
        } else {
            format!("![{}]({}/{})", &caps["alt"], prefix, url)
        }
    }).into_owned()
}
