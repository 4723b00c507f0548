use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::view::display_date;

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    id: &'a str,
    title: &'a str,
    author: &'a str,
    category: &'a str,
    date: String,
    tags: Vec<ViewTag<'a>>,
    post_content: &'a str,
    related: Vec<RelatedCard>,
}

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct RelatedCard {
    link: String,
    title: String,
    excerpt: String,
    date: String,
    category: String,
}

pub struct PostRenderer<'a> {
    template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    /// `post_content` is the already-rendered article HTML; related posts
    /// come straight from the filter engine.
    pub fn render(&self, post: &Post, post_content: &str, related: &[&Post]) -> String {
        let tags: Vec<ViewTag> = post.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect();
        let related: Vec<RelatedCard> = related.iter()
            .map(|other| RelatedCard {
                link: format!("/view/{}", other.link),
                title: other.title.clone(),
                excerpt: other.excerpt.clone(),
                date: display_date(other),
                category: other.category.clone(),
            })
            .collect();

        self.template.render(&ViewItem {
            id: post.id.0.as_str(),
            title: post.title.as_str(),
            author: post.author.as_str(),
            category: post.category.as_str(),
            date: display_date(post),
            tags,
            post_content,
            related,
        })
    }
}
