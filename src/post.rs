use fmt::Display;
use std::fmt::Formatter;
use std::io::ErrorKind;
use std::path::Path;
use std::{fmt, fs, io};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::text_utils::parse_post_date;

pub const PREVIEW_BREAK: &str = "<!-- more -->";

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

/// One article. The date is kept as the free-form text found in the file
/// and only parsed on demand: a post with a date nobody can parse is still
/// a valid post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub link: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub date: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub body: String,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, author={}, category={}\ntitle={}",
               self.id.0,
               self.date,
               self.author,
               self.category,
               self.title,
        )
    }
}

/// Example of a post file
/// [ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
/// [DATE]: # (Jan 15, 2024)
/// [AUTHOR]: # (Alex Thompson)
/// [CATEGORY]: # (Web Development)
/// [TAGS]: # (React, AI, Trends)
///
/// # The Future of Web Development
impl Post {
    pub fn from_file(link: &str, file_path: &Path) -> io::Result<Post> {
        let raw = fs::read_to_string(file_path)?;
        Self::from_string(link, file_path, &raw)
    }

    pub fn from_string(link: &str, file_path: &Path, raw: &str) -> io::Result<Post> {
        let mut id = String::new();
        let mut date = String::new();
        let mut author = String::new();
        let mut category = String::new();
        let mut tags = String::new();
        let mut excerpt = String::new();
        let mut featured = String::new();
        let mut title = String::new();

        let mut body = String::new();
        let mut in_body = false;

        for line in raw.lines() {
            if in_body {
                body.push_str(line);
                body.push('\n');
                continue;
            }

            let line = line.trim();

            // The header block may be wrapped in an HTML comment
            if line.is_empty() || line == "<!--" || line == "-->" {
                continue;
            }

            if let Some(rest) = line.strip_prefix("# ") {
                title = rest.to_string();
                in_body = true;
                continue;
            }

            let (key, val) = match Self::extract_header(line) {
                None => continue,
                Some((k, v)) => (k, v),
            };

            match key {
                "ID" => id = val.to_string(),
                "DATE" => date = val.to_string(),
                "AUTHOR" => author = val.to_string(),
                "CATEGORY" => category = val.to_string(),
                "TAGS" => tags = val.to_string(),
                "EXCERPT" => excerpt = val.to_string(),
                "FEATURED" => featured = val.to_string(),
                _ => {}
            }
        }

        if id.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Missing post id - file={}", file_path.to_str().unwrap_or("?"))));
        }

        if excerpt.is_empty() {
            excerpt = first_text_line(&body);
        }

        Ok(Post {
            id: PostId(id),
            link: link.to_string(),
            title,
            excerpt,
            author,
            category,
            date,
            tags: Self::extract_tags(&tags),
            featured: Self::extract_flag(&featured),
            body,
        })
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_post_date(&self.date).ok()
    }

    /// Body up to the preview break tag; the whole body when there is none.
    pub fn preview(&self) -> &str {
        match self.body.find(PREVIEW_BREAK) {
            Some(pos) => &self.body[..pos],
            None => self.body.as_str(),
        }
    }

    fn extract_header(line: &str) -> Option<(&str, &str)> {
        lazy_static! {
            static ref HEADER_REGEX: Regex = Regex::new(
                r"\[(?P<key>\w+)\]: # \((?P<value>.*)\)"
            ).unwrap();
        }

        HEADER_REGEX.captures(line).and_then(|cap| {
            let key = cap.name("key").map(|key| key.as_str());
            let val = cap.name("value").map(|val| val.as_str());
            match (key, val) {
                (Some(key), Some(val)) => Some((key, val)),
                _ => None,
            }
        })
    }

    fn extract_tags(tags_str: &str) -> Vec<String> {
        tags_str.split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    fn extract_flag(value: &str) -> bool {
        matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
    }
}

fn first_text_line(body: &str) -> String {
    body.lines()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with("<!--"))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::test_data::POST_FIXTURE;

    use super::*;

    #[test]
    fn test_extract_header() {
        let res = Post::extract_header("[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)");
        assert_eq!(res, Some(("ID", "a63bd715-a3fe-4788-b0e1-2a3153778544")));
        let res = Post::extract_header("[DATE]: # (Jan 15, 2024)");
        assert_eq!(res, Some(("DATE", "Jan 15, 2024")));
        let res = Post::extract_header("[CATEGORY]: # (Web Development)");
        assert_eq!(res, Some(("CATEGORY", "Web Development")));
        let res = Post::extract_header("[TAGS]: # (React, AI, Edge Computing)");
        assert_eq!(res, Some(("TAGS", "React, AI, Edge Computing")));

        let res = Post::extract_header("[AUTHOR]: (missing marker)");
        assert!(res.is_none());
    }

    #[test]
    fn test_extract_tags_multi_word() {
        let tags = Post::extract_tags("React Native, Mobile,  Performance , ");
        assert_eq!(tags, ["React Native", "Mobile", "Performance"]);
    }

    #[test]
    fn test_from_string() {
        let file_name = PathBuf::from("posts/future_of_web_development/index.md");
        let post = Post::from_string("future_of_web_development", &file_name, POST_FIXTURE).unwrap();

        assert_eq!(post.id, PostId("a63bd715-a3fe-4788-b0e1-2a3153778544".to_string()));
        assert_eq!(post.link, "future_of_web_development");
        assert_eq!(post.title, "The Future of Web Development: Trends to Watch in 2024");
        assert_eq!(post.author, "Alex Thompson");
        assert_eq!(post.category, "Web Development");
        assert_eq!(post.date, "Jan 15, 2024");
        assert_eq!(post.tags, ["React", "AI", "Trends", "PWA", "Edge Computing"]);
        assert!(post.featured);
        assert!(post.excerpt.starts_with("Explore the latest trends"));
        assert_eq!(post.parsed_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_preview_stops_at_break_tag() {
        let file_name = PathBuf::from("posts/future_of_web_development/index.md");
        let post = Post::from_string("future_of_web_development", &file_name, POST_FIXTURE).unwrap();

        assert!(post.preview().contains("The pace of change in web development"));
        assert!(!post.preview().contains("Edge computing moves"));
        assert!(post.body.contains("Edge computing moves"));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let file_name = PathBuf::from("posts/broken.md");
        let raw = "[AUTHOR]: # (Sarah Kim)\n\n# A post without identity\n\nBody.\n";
        let res = Post::from_string("broken", &file_name, raw);
        assert!(res.is_err());
    }

    #[test]
    fn test_unparseable_date_is_not_an_error() {
        let file_name = PathBuf::from("posts/undated.md");
        let raw = "[ID]: # (undated-1)\n[DATE]: # (sometime soon)\n\n# Undated\n\nBody.\n";
        let post = Post::from_string("undated", &file_name, raw).unwrap();
        assert_eq!(post.date, "sometime soon");
        assert_eq!(post.parsed_date(), None);
    }

    #[test]
    fn test_excerpt_falls_back_to_first_body_line() {
        let file_name = PathBuf::from("posts/plain.md");
        let raw = "[ID]: # (plain-1)\n\n# Plain\n\nFirst line of the body.\nSecond line.\n";
        let post = Post::from_string("plain", &file_name, raw).unwrap();
        assert_eq!(post.excerpt, "First line of the body.");
    }
}
