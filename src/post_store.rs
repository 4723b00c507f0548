use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::Result;
use spdlog::warn;

use crate::fixtures::builtin_posts;
use crate::post::Post;

/// In-memory post collection. Loaded once at startup; the filter engine
/// only ever sees it as an immutable slice.
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    pub fn from_posts(posts: Vec<Post>) -> PostStore {
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique = Vec::with_capacity(posts.len());

        for post in posts {
            // Duplicated ids: first occurrence wins
            if !seen.insert(post.id.0.clone()) {
                warn!("Skipping post {} - duplicated id {}", post.link, post.id.0);
                continue;
            }
            unique.push(post);
        }

        PostStore { posts: unique }
    }

    pub fn builtin() -> PostStore {
        Self::from_posts(builtin_posts())
    }

    pub fn from_dir(posts_dir: &Path, index_base_name: &str) -> Result<PostStore> {
        let mut posts = vec![];
        for (link, path) in scan_post_files(posts_dir, index_base_name)? {
            match Post::from_file(&link, &path) {
                Ok(post) => posts.push(post),
                Err(e) => warn!("Skipping {}: {}", path.to_str().unwrap_or("?"), e),
            }
        }
        Ok(Self::from_posts(posts))
    }

    /// Posts from the configured directory, or the compiled-in set when
    /// the directory is missing or holds nothing loadable.
    pub fn load(posts_dir: &Path, index_base_name: &str) -> PostStore {
        match Self::from_dir(posts_dir, index_base_name) {
            Ok(store) if !store.is_empty() => store,
            Ok(_) => {
                warn!("No posts under {}, serving the built-in articles", posts_dir.to_str().unwrap_or("?"));
                Self::builtin()
            }
            Err(e) => {
                warn!("Error reading posts dir {}: {}. Serving the built-in articles", posts_dir.to_str().unwrap_or("?"), e);
                Self::builtin()
            }
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn by_link(&self, link: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.link == link)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Post sources are either flat markdown files in the posts directory or
/// subdirectories holding `<index_base_name>.md` next to their images.
fn scan_post_files(posts_dir: &Path, index_base_name: &str) -> io::Result<Vec<(String, PathBuf)>> {
    let index_file = format!("{}.md", index_base_name);
    let mut found = vec![];

    for entry in fs::read_dir(posts_dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = match entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if file_type.is_file() {
            if let Some(stem) = name.strip_suffix(".md") {
                found.push((stem.to_string(), entry.path()));
            }
            continue;
        }

        if file_type.is_dir() {
            let candidate = entry.path().join(&index_file);
            if candidate.is_file() {
                found.push((name, candidate));
            }
        }
    }

    // Directory listing order is OS-dependent
    found.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use crate::post::PostId;

    use super::*;

    fn tiny_post(id: &str, link: &str) -> Post {
        Post {
            id: PostId(id.to_string()),
            link: link.to_string(),
            title: format!("title-{}", link),
            excerpt: "".to_string(),
            author: "Sarah Kim".to_string(),
            category: "DevOps".to_string(),
            date: "Jan 3, 2024".to_string(),
            tags: vec![],
            featured: false,
            body: "".to_string(),
        }
    }

    #[test]
    fn test_duplicated_id_keeps_first() {
        let store = PostStore::from_posts(vec![
            tiny_post("a", "first"),
            tiny_post("b", "second"),
            tiny_post("a", "third"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.posts()[0].link, "first");
        assert_eq!(store.posts()[1].link, "second");
        assert!(store.by_link("third").is_none());
    }

    #[test]
    fn test_by_link() {
        let store = PostStore::builtin();
        let post = store.by_link("devops_for_small_teams").unwrap();
        assert_eq!(post.author, "Michael Rodriguez");
        assert!(store.by_link("missing").is_none());
    }

    #[test]
    fn test_builtin_store_is_not_empty() {
        let store = PostStore::builtin();
        assert!(!store.is_empty());
        assert_eq!(store.len(), store.posts().len());
    }
}
