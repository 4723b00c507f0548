use std::collections::HashMap;
use std::str::FromStr;
use std::string::ToString;

use crate::filter::{SearchCriteria, SortKey};
use crate::text_utils::parse_post_date;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get_page(&self) -> u32 {
        let one = "1".to_string();
        let val = self.items.get("page").unwrap_or(&one);
        let val: u32 = val.parse().unwrap_or(1);
        if val == 0 { return 1; }
        val
    }

    /// The criteria set for the blog listing. Anything missing or
    /// malformed falls back to its default - a bad query string narrows
    /// nothing and breaks nothing.
    pub fn criteria(&self) -> SearchCriteria {
        let value = |key: &str| self.items.get(key).cloned().unwrap_or_default();

        let tags: Vec<String> = value("tags")
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        let date_of = |key: &str| {
            self.items.get(key).and_then(|v| parse_post_date(v).ok())
        };

        let sort = self.items.get("sort")
            .and_then(|v| SortKey::from_str(v).ok())
            .unwrap_or_default();

        SearchCriteria {
            search_text: value("search"),
            category: value("category"),
            author: value("author"),
            tags,
            date_from: date_of("from"),
            date_to: date_of("to"),
            sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::filter::ALL;

    use super::*;

    #[test]
    fn test_parse_query_str() {
        let buf = "search=edge%20computing&category=Web%20Development&page=2";
        let qs = QueryString::from(buf);

        assert_eq!(qs.get_page(), 2);
        let criteria = qs.criteria();
        assert_eq!(criteria.search_text, "edge computing");
        assert_eq!(criteria.category, "Web Development");
        assert_eq!(criteria.sort, SortKey::DateDesc);
    }

    #[test]
    fn test_full_criteria() {
        let buf = "search=ai&category=Design&author=Emily%20Chen&tags=AI,UX%20Design&from=2024-01-01&to=2024-01-31&sort=title-asc";
        let criteria = QueryString::from(buf).criteria();

        assert_eq!(criteria.search_text, "ai");
        assert_eq!(criteria.category, "Design");
        assert_eq!(criteria.author, "Emily Chen");
        assert_eq!(criteria.tags, ["AI", "UX Design"]);
        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(criteria.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(criteria.sort, SortKey::TitleAsc);
    }

    #[test]
    fn test_empty_query_is_the_default_criteria() {
        let criteria = QueryString::from("").criteria();
        assert_eq!(criteria, SearchCriteria::default());
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_all_sentinel_passes_through_as_inactive() {
        let criteria = QueryString::from("category=all&author=all").criteria();
        assert_eq!(criteria.category, ALL);
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let buf = "sort=popularity&from=whenever&page=minus-two";
        let qs = QueryString::from(buf);

        assert_eq!(qs.get_page(), 1);
        let criteria = qs.criteria();
        assert_eq!(criteria.sort, SortKey::DateDesc);
        assert_eq!(criteria.date_from, None);
    }

    #[test]
    fn test_page_zero_becomes_one() {
        let qs = QueryString::from("page=0");
        assert_eq!(qs.get_page(), 1);
    }
}
