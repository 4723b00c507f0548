use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::filter::{Facet, SearchCriteria};
use crate::post::Post;
use crate::view::display_date;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    heading: &'a str,
    shown_count: usize,
    total_count: usize,
    search_text: &'a str,
    featured: Vec<PostCard>,
    post_list: Vec<PostCard>,
    categories: Vec<FacetItem<'a>>,
    authors: Vec<FacetItem<'a>>,
    tags: Vec<FacetItem<'a>>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
}

#[derive(ramhorns::Content)]
struct PostCard {
    link: String,
    title: String,
    excerpt: String,
    author: String,
    category: String,
    date: String,
    tags: Vec<ViewTag>,
}

#[derive(ramhorns::Content)]
struct ViewTag {
    tag: String,
}

#[derive(ramhorns::Content)]
struct FacetItem<'a> {
    name: &'a str,
    count: u32,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
}

/// Everything the blog listing needs: the filtered page of posts, the
/// highlighted article, the facet panels and pagination.
pub struct ListInput<'a> {
    pub criteria: &'a SearchCriteria,
    pub featured: Option<&'a Post>,
    pub posts: &'a [&'a Post],
    pub total_count: usize,
    pub categories: &'a [Facet],
    pub authors: &'a [Facet],
    pub tags: &'a [Facet],
    pub cur_page: u32,
    pub page_count: u32,
}

pub struct ListRenderer<'a> {
    template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
        })
    }

    pub fn render(&self, input: &ListInput) -> String {
        let heading = if input.criteria.has_active_filters() {
            "Search Results"
        } else {
            "Latest Articles"
        };

        let featured: Vec<PostCard> = input.featured.map(post_card).into_iter().collect();
        let post_list: Vec<PostCard> = input.posts.iter().map(|post| post_card(*post)).collect();
        let shown_count = post_list.len();

        let page_list: Vec<ViewPagination> = (1..=input.page_count)
            .map(|number| ViewPagination { current: number == input.cur_page, number })
            .collect();

        self.template.render(&ListPage {
            heading,
            shown_count,
            total_count: input.total_count,
            search_text: input.criteria.search_text.as_str(),
            featured,
            post_list,
            categories: facet_items(input.categories),
            authors: facet_items(input.authors),
            tags: facet_items(input.tags),
            show_pagination: input.page_count > 1,
            page_list,
        })
    }
}

fn post_card(post: &Post) -> PostCard {
    PostCard {
        link: format!("/view/{}", post.link),
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        author: post.author.clone(),
        category: post.category.clone(),
        date: display_date(post),
        tags: post.tags.iter().map(|tag| ViewTag { tag: tag.clone() }).collect(),
    }
}

fn facet_items(facets: &[Facet]) -> Vec<FacetItem> {
    facets.iter()
        .map(|facet| FacetItem { name: facet.name.as_str(), count: facet.count })
        .collect()
}
