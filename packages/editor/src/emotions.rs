//! Emotion (emoji) catalog
//!
//! Built from an [`EmotionData`] description: named groups of emotion ids,
//! each id mapped to an image path relative to `baseDir`. Groups keep the
//! order they are declared in and so do the ids inside a group.

use postkit_common::{read_json_if_exists, CommonResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path as FsPath;

/// Tiles per page when browsing a group
pub const DEFAULT_PER_PAGE: usize = 10;

/// Serialized catalog description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionData {
    #[serde(default)]
    pub data: Vec<EmotionGroupData>,

    #[serde(default)]
    pub base_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionGroupData {
    pub name: String,

    /// `id -> relative path`, in declaration order
    #[serde(default)]
    pub items: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionGroup {
    pub name: String,
    pub ids: Vec<String>,
}

/// One emotion ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionTile {
    pub id: String,
    pub url: String,
}

/// One page of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionPage {
    /// 1-based page number
    pub page: usize,
    pub total_pages: usize,
    pub tiles: Vec<EmotionTile>,
}

/// Emotion groups plus the id → URL table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionCatalog {
    groups: Vec<EmotionGroup>,
    urls: HashMap<String, String>,
}

impl EmotionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: &EmotionData) -> Self {
        let mut catalog = Self::new();
        for group in &data.data {
            let items = group.items.iter().filter_map(|(id, path)| {
                path.as_str()
                    .map(|path| (id.clone(), format!("{}{}", data.base_dir, path)))
            });
            catalog.add_items(&group.name, items);
        }
        catalog
    }

    /// Load a catalog description from disk; a missing file gives an empty
    /// catalog
    pub fn load(path: &FsPath) -> CommonResult<Self> {
        let data: Option<EmotionData> = read_json_if_exists(path)?;
        Ok(data.map(|data| Self::from_data(&data)).unwrap_or_default())
    }

    /// Add `(id, url)` items to a group, creating it when new
    ///
    /// Ids are unique per group; re-adding an id only updates its URL.
    pub fn add_items<I>(&mut self, group: &str, items: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let index = match self.groups.iter().position(|g| g.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(EmotionGroup {
                    name: group.to_string(),
                    ids: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        for (id, url) in items {
            let ids = &mut self.groups[index].ids;
            if !ids.contains(&id) {
                ids.push(id.clone());
            }
            self.urls.insert(id, url);
        }
    }

    /// Whether there is anything to show at all
    pub fn is_enabled(&self) -> bool {
        self.groups.iter().any(|group| !group.ids.is_empty())
    }

    /// Group names in display order
    pub fn groups(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    pub fn emotions_for_group(&self, group: &str) -> Vec<EmotionTile> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.ids.iter().filter_map(|id| self.tile(id)).collect())
            .unwrap_or_default()
    }

    /// URL of an emotion
    pub fn get_emotion(&self, id: &str) -> Option<&str> {
        self.urls.get(id).map(String::as_str)
    }

    fn tile(&self, id: &str) -> Option<EmotionTile> {
        self.get_emotion(id).map(|url| EmotionTile {
            id: id.to_string(),
            url: url.to_string(),
        })
    }

    /// Tiles of the 1-based `page` of `group`
    ///
    /// Out-of-range pages (including page 0) are empty but still report
    /// the group's page count.
    pub fn page(&self, group: &str, page: usize, per_page: usize) -> EmotionPage {
        let tiles = self.emotions_for_group(group);
        let per_page = per_page.max(1);
        let total_pages = tiles.len().div_ceil(per_page);

        let tiles = match page.checked_sub(1).and_then(|index| index.checked_mul(per_page)) {
            Some(start) => tiles.into_iter().skip(start).take(per_page).collect(),
            None => Vec::new(),
        };

        EmotionPage {
            page,
            total_pages,
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> EmotionCatalog {
        let data: EmotionData = serde_json::from_value(json!({
            "baseDir": "/e/",
            "data": [
                { "name": "A", "items": { "smile": "a/smile.png", "wink": "a/wink.png" } },
                { "name": "B", "items": { "cat": "b/cat.gif" } }
            ]
        }))
        .unwrap();
        EmotionCatalog::from_data(&data)
    }

    #[test]
    fn test_groups_in_declaration_order() {
        let catalog = catalog();
        assert!(catalog.is_enabled());
        assert_eq!(catalog.groups(), vec!["A", "B"]);
        assert_eq!(catalog.get_emotion("cat"), Some("/e/b/cat.gif"));
        assert_eq!(catalog.get_emotion("nope"), None);

        let ids: Vec<String> = catalog
            .emotions_for_group("A")
            .into_iter()
            .map(|tile| tile.id)
            .collect();
        assert_eq!(ids, vec!["smile", "wink"]);
    }

    #[test]
    fn test_add_items_keeps_ids_unique() {
        let mut catalog = EmotionCatalog::new();
        assert!(!catalog.is_enabled());

        catalog.add_items("A", [("x".to_string(), "/1".to_string())]);
        catalog.add_items("A", [("x".to_string(), "/2".to_string())]);

        assert_eq!(catalog.emotions_for_group("A").len(), 1);
        assert_eq!(catalog.get_emotion("x"), Some("/2"));
    }

    #[test]
    fn test_pagination() {
        let mut catalog = EmotionCatalog::new();
        catalog.add_items(
            "big",
            (0..23).map(|i| (format!("e{}", i), format!("/e{}.png", i))),
        );

        let first = catalog.page("big", 1, DEFAULT_PER_PAGE);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.tiles.len(), 10);
        assert_eq!(first.tiles[0].id, "e0");

        let last = catalog.page("big", 3, DEFAULT_PER_PAGE);
        assert_eq!(last.tiles.len(), 3);
        assert_eq!(last.tiles[2].id, "e22");

        assert!(catalog.page("big", 0, DEFAULT_PER_PAGE).tiles.is_empty());
        assert!(catalog.page("big", 4, DEFAULT_PER_PAGE).tiles.is_empty());
        assert_eq!(catalog.page("missing", 1, DEFAULT_PER_PAGE).total_pages, 0);
    }

    #[test]
    fn test_pagination_far_past_the_end() {
        let mut catalog = EmotionCatalog::new();
        catalog.add_items("g", [("1".to_string(), "/1.png".to_string())]);

        let page = catalog.page("g", usize::MAX, DEFAULT_PER_PAGE);
        assert!(page.tiles.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(catalog.page("g", usize::MAX / 2, usize::MAX).tiles.is_empty());
    }
}
