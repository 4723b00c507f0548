use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::post::Post;

/// Sentinel that disables the category/author filters. An empty selection
/// means the same thing.
pub const ALL: &str = "all";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
    AuthorAsc,
    AuthorDesc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(SortKey::DateDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "title-asc" => Ok(SortKey::TitleAsc),
            "title-desc" => Ok(SortKey::TitleDesc),
            "author-asc" => Ok(SortKey::AuthorAsc),
            "author-desc" => Ok(SortKey::AuthorDesc),
            other => Err(format!("Unknown sort key {}", other)),
        }
    }
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::AuthorAsc => "author-asc",
            SortKey::AuthorDesc => "author-desc",
        }
    }

    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            SortKey::DateDesc => cmp_dates(a.parsed_date(), b.parsed_date(), true),
            SortKey::DateAsc => cmp_dates(a.parsed_date(), b.parsed_date(), false),
            SortKey::TitleAsc => cmp_text(&a.title, &b.title),
            SortKey::TitleDesc => cmp_text(&b.title, &a.title),
            SortKey::AuthorAsc => cmp_text(&a.author, &b.author),
            SortKey::AuthorDesc => cmp_text(&b.author, &a.author),
        }
    }
}

// Posts without a parseable date sort after every dated post in either
// direction and compare equal to each other, so their relative input order
// is preserved by the stable sort.
fn cmp_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, newest_first: bool) -> Ordering {
    match (a, b) {
        (Some(da), Some(db)) => if newest_first { db.cmp(&da) } else { da.cmp(&db) },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Everything the blog search panel can ask for, as one immutable value.
/// All fields are defaultable; a default criteria set selects every post
/// newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub search_text: String,
    pub category: String,
    pub author: String,
    pub tags: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: SortKey,
}

impl SearchCriteria {
    /// True when any predicate narrows the result set. The sort key alone
    /// does not count: it reorders, it never excludes.
    pub fn has_active_filters(&self) -> bool {
        !self.search_text.trim().is_empty()
            || selection(&self.category).is_some()
            || selection(&self.author).is_some()
            || !self.tags.is_empty()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }
}

fn selection(value: &str) -> Option<&str> {
    if value.is_empty() || value == ALL {
        None
    } else {
        Some(value)
    }
}

/// The filter/sort engine: a pure function from (collection, criteria) to
/// an ordered view. Source records are never touched; the result borrows
/// from the input slice. Never fails - malformed dates and empty inputs
/// produce degenerate results, not errors.
pub fn filter_posts<'a>(posts: &'a [Post], criteria: &SearchCriteria) -> Vec<&'a Post> {
    let mut filtered: Vec<&Post> = posts.iter()
        .filter(|post| matches_text(post, &criteria.search_text))
        .filter(|post| matches_selection(&post.category, &criteria.category))
        .filter(|post| matches_selection(&post.author, &criteria.author))
        .filter(|post| matches_tags(post, &criteria.tags))
        .filter(|post| matches_date_range(post, criteria.date_from, criteria.date_to))
        .collect();

    // sort_by is stable: equal keys keep their input order
    filtered.sort_by(|a, b| criteria.sort.compare(a, b));

    filtered
}

// Free text matches as a case-insensitive substring of the title, excerpt,
// author, category or any tag.
fn matches_text(post: &Post, search_text: &str) -> bool {
    let query = search_text.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    post.title.to_lowercase().contains(&query)
        || post.excerpt.to_lowercase().contains(&query)
        || post.author.to_lowercase().contains(&query)
        || post.category.to_lowercase().contains(&query)
        || post.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
}

fn matches_selection(value: &str, selected: &str) -> bool {
    match selection(selected) {
        None => true,
        Some(wanted) => value == wanted,
    }
}

// Conjunctive: the post must carry every requested tag.
fn matches_tags(post: &Post, required: &[String]) -> bool {
    required.iter().all(|tag| post.tags.contains(tag))
}

// Inclusive on both bounds. A post whose date does not parse cannot be
// judged against the range, so it stays in (fail-open).
fn matches_date_range(post: &Post, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }

    let date = match post.parsed_date() {
        Some(date) => date,
        None => return true,
    };

    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

/// The highlighted article of a listing: first flagged post wins, however
/// many are flagged.
pub fn featured(posts: &[Post]) -> Option<&Post> {
    posts.iter().find(|post| post.featured)
}

#[derive(Debug, PartialEq)]
pub struct Facet {
    pub name: String,
    pub count: u32,
}

pub fn category_facets(posts: &[Post]) -> Vec<Facet> {
    count_values(posts.iter().map(|post| post.category.as_str()))
}

pub fn author_facets(posts: &[Post]) -> Vec<Facet> {
    count_values(posts.iter().map(|post| post.author.as_str()))
}

pub fn tag_facets(posts: &[Post]) -> Vec<Facet> {
    count_values(posts.iter().flat_map(|post| post.tags.iter().map(|tag| tag.as_str())))
}

fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Facet> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for value in values {
        if value.is_empty() {
            continue;
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    counts.into_iter()
        .map(|(name, count)| Facet { name: name.to_string(), count })
        .collect()
}

/// Articles sharing the category or at least one tag with the current one,
/// newest first.
pub fn related_posts<'a>(posts: &'a [Post], current: &Post, limit: usize) -> Vec<&'a Post> {
    let mut related: Vec<&Post> = posts.iter()
        .filter(|post| post.id != current.id)
        .filter(|post| {
            post.category == current.category
                || post.tags.iter().any(|tag| current.tags.contains(tag))
        })
        .collect();

    related.sort_by(|a, b| cmp_dates(a.parsed_date(), b.parsed_date(), true));
    related.truncate(limit);
    related
}

#[cfg(test)]
mod tests {
    use crate::fixtures::builtin_posts;
    use crate::post::PostId;

    use super::*;

    fn post(id: &str, title: &str, date: &str) -> Post {
        Post {
            id: PostId(id.to_string()),
            link: format!("link_{}", id),
            title: title.to_string(),
            excerpt: "".to_string(),
            author: "".to_string(),
            category: "".to_string(),
            date: date.to_string(),
            tags: vec![],
            featured: false,
            body: "".to_string(),
        }
    }

    fn titles(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.title.clone()).collect()
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.0.clone()).collect()
    }

    #[test]
    fn test_no_filters_returns_everything_newest_first() {
        let posts = builtin_posts();
        let result = filter_posts(&posts, &SearchCriteria::default());

        assert_eq!(result.len(), posts.len());
        assert_eq!(ids(&result), ["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let posts = builtin_posts();
        let criteria = SearchCriteria {
            search_text: "cloud".to_string(),
            sort: SortKey::TitleAsc,
            ..Default::default()
        };

        let first: Vec<String> = ids(&filter_posts(&posts, &criteria));
        let second: Vec<String> = ids(&filter_posts(&posts, &criteria));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_collection_is_a_valid_input() {
        let result = filter_posts(&[], &SearchCriteria::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let posts = builtin_posts();
        let criteria = SearchCriteria {
            search_text: "REACT NATIVE".to_string(),
            ..Default::default()
        };

        let result = filter_posts(&posts, &criteria);
        assert_eq!(ids(&result), ["2"]);
    }

    #[test]
    fn test_search_matches_each_field_alone() {
        let make = |id: &str| post(id, "untitled", "Jan 1, 2024");

        let mut by_title = make("t");
        by_title.title = "Shipping with needle inside".to_string();
        let mut by_excerpt = make("e");
        by_excerpt.excerpt = "the Needle is here".to_string();
        let mut by_author = make("a");
        by_author.author = "Ann Needleworth".to_string();
        let mut by_category = make("c");
        by_category.category = "Needle".to_string();
        let mut by_tag = make("g");
        by_tag.tags = vec!["needlepoint".to_string()];
        let miss = make("m");

        let posts = vec![by_title, by_excerpt, by_author, by_category, by_tag, miss];
        let criteria = SearchCriteria {
            search_text: "needle".to_string(),
            ..Default::default()
        };

        let result = filter_posts(&posts, &criteria);
        let mut found = ids(&result);
        found.sort();
        assert_eq!(found, ["a", "c", "e", "g", "t"]);
    }

    #[test]
    fn test_search_matches_category_when_title_lacks_the_term() {
        let mut p = post("1", "Practices for Small Teams", "Jan 10, 2024");
        p.category = "DevOps".to_string();

        let posts = vec![p, post("2", "Unrelated", "Jan 1, 2024")];
        let criteria = SearchCriteria {
            search_text: "devops".to_string(),
            ..Default::default()
        };

        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["1"]);
    }

    #[test]
    fn test_category_all_sentinel_means_no_filter() {
        let posts = builtin_posts();

        let explicit = SearchCriteria { category: ALL.to_string(), ..Default::default() };
        let omitted = SearchCriteria::default();

        assert_eq!(
            ids(&filter_posts(&posts, &explicit)),
            ids(&filter_posts(&posts, &omitted)),
        );
    }

    #[test]
    fn test_category_filter_is_exact() {
        let posts = builtin_posts();
        let criteria = SearchCriteria {
            category: "Security".to_string(),
            ..Default::default()
        };

        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["5"]);
    }

    #[test]
    fn test_author_all_sentinel_and_exact_match() {
        let posts = builtin_posts();

        let all = SearchCriteria { author: ALL.to_string(), ..Default::default() };
        assert_eq!(filter_posts(&posts, &all).len(), posts.len());

        let one = SearchCriteria { author: "Alex Thompson".to_string(), ..Default::default() };
        assert_eq!(ids(&filter_posts(&posts, &one)), ["1", "5"]);
    }

    #[test]
    fn test_tag_filter_is_conjunctive() {
        let posts = builtin_posts();

        let both = SearchCriteria {
            tags: vec!["AI".to_string(), "Trends".to_string()],
            ..Default::default()
        };
        // Post 4 carries AI but not Trends, so it is out
        assert_eq!(ids(&filter_posts(&posts, &both)), ["1"]);
    }

    #[test]
    fn test_single_required_tag_matches_exactly_the_posts_carrying_it() {
        let mut posts: Vec<Post> = (1..=5).map(|n| post(&n.to_string(), "x", "Jan 1, 2024")).collect();
        posts[3].tags = vec!["AI".to_string()];

        let criteria = SearchCriteria {
            tags: vec!["AI".to_string()],
            ..Default::default()
        };

        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["4"]);
    }

    #[test]
    fn test_date_range_is_inclusive_on_both_bounds() {
        let posts = builtin_posts();
        let criteria = SearchCriteria {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 5),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 10),
            ..Default::default()
        };

        // Jan 10, Jan 8 and Jan 5 are all in; Jan 12 and Jan 3 are out
        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["3", "4", "5"]);
    }

    #[test]
    fn test_date_range_fails_open_for_unparseable_dates() {
        let posts = vec![
            post("dated", "Dated", "Jan 10, 2024"),
            post("undated", "Undated", "to be confirmed"),
        ];
        let criteria = SearchCriteria {
            date_from: NaiveDate::from_ymd_opt(2024, 2, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 2, 28),
            ..Default::default()
        };

        // The dated post is outside the range; the undated one stays in
        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["undated"]);
    }

    #[test]
    fn test_sort_scenario_date_desc_and_title_asc_agree() {
        let posts = vec![
            post("b", "B", "2024-01-10"),
            post("a", "A", "2024-01-15"),
        ];

        let by_date = SearchCriteria { sort: SortKey::DateDesc, ..Default::default() };
        assert_eq!(titles(&filter_posts(&posts, &by_date)), ["A", "B"]);

        let by_title = SearchCriteria { sort: SortKey::TitleAsc, ..Default::default() };
        assert_eq!(titles(&filter_posts(&posts, &by_title)), ["A", "B"]);
    }

    #[test]
    fn test_title_desc_is_the_reverse_of_title_asc() {
        let posts = builtin_posts();

        let asc = SearchCriteria { sort: SortKey::TitleAsc, ..Default::default() };
        let desc = SearchCriteria { sort: SortKey::TitleDesc, ..Default::default() };

        let mut reversed = ids(&filter_posts(&posts, &asc));
        reversed.reverse();
        assert_eq!(reversed, ids(&filter_posts(&posts, &desc)));
    }

    #[test]
    fn test_author_sort_is_case_insensitive() {
        let mut one = post("1", "x", "Jan 1, 2024");
        one.author = "alex".to_string();
        let mut two = post("2", "y", "Jan 2, 2024");
        two.author = "Brooke".to_string();

        let posts = vec![two, one];
        let criteria = SearchCriteria { sort: SortKey::AuthorAsc, ..Default::default() };
        assert_eq!(ids(&filter_posts(&posts, &criteria)), ["1", "2"]);
    }

    #[test]
    fn test_date_sort_puts_unparseable_dates_last_preserving_their_order() {
        let posts = vec![
            post("u1", "First undated", "n/a"),
            post("old", "Old", "Jan 1, 2024"),
            post("u2", "Second undated", "unknown"),
            post("new", "New", "Jan 20, 2024"),
        ];

        let desc = SearchCriteria { sort: SortKey::DateDesc, ..Default::default() };
        assert_eq!(ids(&filter_posts(&posts, &desc)), ["new", "old", "u1", "u2"]);

        let asc = SearchCriteria { sort: SortKey::DateAsc, ..Default::default() };
        assert_eq!(ids(&filter_posts(&posts, &asc)), ["old", "new", "u1", "u2"]);
    }

    #[test]
    fn test_equal_sort_keys_keep_insertion_order() {
        let posts = vec![
            post("first", "Same title", "Jan 5, 2024"),
            post("second", "Same title", "Jan 5, 2024"),
            post("third", "Same title", "Jan 5, 2024"),
        ];

        for sort in [SortKey::DateDesc, SortKey::DateAsc, SortKey::TitleAsc] {
            let criteria = SearchCriteria { sort, ..Default::default() };
            assert_eq!(ids(&filter_posts(&posts, &criteria)), ["first", "second", "third"]);
        }
    }

    #[test]
    fn test_has_active_filters_ignores_the_sort_key() {
        let mut criteria = SearchCriteria::default();
        assert!(!criteria.has_active_filters());

        criteria.sort = SortKey::TitleDesc;
        assert!(!criteria.has_active_filters());

        criteria.tags = vec!["AI".to_string()];
        assert!(criteria.has_active_filters());
    }

    #[test]
    fn test_featured_first_match_wins() {
        let mut posts = vec![
            post("1", "a", "Jan 1, 2024"),
            post("2", "b", "Jan 2, 2024"),
            post("3", "c", "Jan 3, 2024"),
        ];
        posts[1].featured = true;
        posts[2].featured = true;

        assert_eq!(featured(&posts).unwrap().id.0, "2");

        posts[1].featured = false;
        posts[2].featured = false;
        assert!(featured(&posts).is_none());
    }

    #[test]
    fn test_category_facets_are_alphabetical_with_counts() {
        let posts = builtin_posts();
        let facets = category_facets(&posts);

        let names: Vec<&str> = facets.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Design", "DevOps", "Industry Insights", "Mobile Development", "Security", "Web Development"]);
        assert!(facets.iter().all(|f| f.count == 1));
    }

    #[test]
    fn test_author_facets_count_repeats() {
        let posts = builtin_posts();
        let facets = author_facets(&posts);

        let alex = facets.iter().find(|f| f.name == "Alex Thompson").unwrap();
        assert_eq!(alex.count, 2);
    }

    #[test]
    fn test_tag_facets_count_cross_post_tags() {
        let posts = builtin_posts();
        let facets = tag_facets(&posts);

        let ai = facets.iter().find(|f| f.name == "AI").unwrap();
        assert_eq!(ai.count, 2);
    }

    #[test]
    fn test_related_posts_share_category_or_tag() {
        let posts = builtin_posts();
        let current = posts.iter().find(|p| p.id.0 == "1").unwrap();

        let related = related_posts(&posts, current, 3);
        // Post 4 shares the AI tag; nothing else overlaps with post 1
        assert_eq!(ids(&related), ["4"]);
    }

    #[test]
    fn test_related_posts_excludes_current_and_respects_limit() {
        let mut posts: Vec<Post> = (1..=5)
            .map(|n| post(&n.to_string(), "t", &format!("Jan {}, 2024", n)))
            .collect();
        for p in posts.iter_mut() {
            p.category = "Design".to_string();
        }

        let current = posts[0].clone();
        let related = related_posts(&posts, &current, 2);
        assert_eq!(ids(&related), ["5", "4"]);
    }

    #[test]
    fn test_sort_key_round_trips_through_strings() {
        for key in [SortKey::DateDesc, SortKey::DateAsc, SortKey::TitleAsc,
                    SortKey::TitleDesc, SortKey::AuthorAsc, SortKey::AuthorDesc] {
            assert_eq!(SortKey::from_str(key.as_str()), Ok(key));
        }
        assert!(SortKey::from_str("popularity").is_err());
        assert_eq!(SortKey::default(), SortKey::DateDesc);
    }
}
