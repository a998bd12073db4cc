use crate::catalog::DocumentRecord;

/// Sort selections offered on result lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    MoreUpvotes,
    FewerDownvotes,
    AlphabeticalTitle,
}

/// In-memory filter over an already-fetched result list: a free-text
/// substring filter re-applied on every query change, and a sort applied
/// once to the currently filtered list. Changing the query drops the active
/// sort; that mirrors the original UI and is intentional until product says
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    all: Vec<DocumentRecord>,
    query: String,
    sort: Option<SortOrder>,
    visible: Vec<DocumentRecord>,
}

impl ResultSet {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        let visible = records.clone();
        Self {
            all: records,
            query: String::new(),
            sort: None,
            visible,
        }
    }

    pub fn visible(&self) -> &[DocumentRecord] {
        &self.visible
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    /// Case-insensitive substring filter over title and description.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.sort = None;

        if query.trim().is_empty() {
            self.visible = self.all.clone();
            return;
        }

        let needle = query.to_lowercase();
        self.visible = self
            .all
            .iter()
            .filter(|record| {
                record.document.title.to_lowercase().contains(&needle)
                    || record.document.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
    }

    /// Sort the currently visible list. Not re-applied after the query
    /// changes.
    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort = Some(order);

        match order {
            SortOrder::MoreUpvotes => self
                .visible
                .sort_by(|a, b| b.upvote.len().cmp(&a.upvote.len())),
            SortOrder::FewerDownvotes => self
                .visible
                .sort_by(|a, b| a.downvote.len().cmp(&b.downvote.len())),
            SortOrder::AlphabeticalTitle => self
                .visible
                .sort_by(|a, b| a.document.title.cmp(&b.document.title)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DocumentRow, ResourceType};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(title: &str, upvotes: usize, downvotes: usize) -> DocumentRecord {
        DocumentRecord {
            document: DocumentRow {
                id: Uuid::new_v4(),
                url: "https://example.com/x.pdf".to_string(),
                year: "2".to_string(),
                branch: "Computer Science".to_string(),
                semester: "3".to_string(),
                subject: "Data Structures".to_string(),
                subjectcode: "CSPC-203".to_string(),
                r#type: ResourceType::NotesOrPpt,
                author: "A Student".to_string(),
                author_email: "a@nitj.ac.in".to_string(),
                title: title.to_string(),
                description: "notes".to_string(),
                created_at: Utc::now(),
            },
            upvote: (0..upvotes).map(|i| format!("u{i}@x.com")).collect(),
            downvote: (0..downvotes).map(|i| format!("d{i}@x.com")).collect(),
            saved_users: Vec::new(),
        }
    }

    fn titles(set: &ResultSet) -> Vec<&str> {
        set.visible()
            .iter()
            .map(|r| r.document.title.as_str())
            .collect()
    }

    #[test]
    fn query_filters_by_substring() {
        let mut set = ResultSet::new(vec![record("DSA Notes", 0, 0), record("OS Notes", 0, 0)]);

        set.set_query("dsa");
        assert_eq!(titles(&set), vec!["DSA Notes"]);

        set.set_query("");
        assert_eq!(set.visible().len(), 2);
    }

    #[test]
    fn sort_by_upvotes_descending() {
        let mut set = ResultSet::new(vec![
            record("low", 1, 0),
            record("high", 5, 0),
            record("mid", 3, 0),
        ]);

        set.set_sort(SortOrder::MoreUpvotes);
        assert_eq!(titles(&set), vec!["high", "mid", "low"]);
    }

    #[test]
    fn sort_by_downvotes_ascending() {
        let mut set = ResultSet::new(vec![record("worse", 0, 4), record("better", 0, 1)]);

        set.set_sort(SortOrder::FewerDownvotes);
        assert_eq!(titles(&set), vec!["better", "worse"]);
    }

    #[test]
    fn sort_alphabetically() {
        let mut set = ResultSet::new(vec![record("b", 0, 0), record("a", 0, 0)]);

        set.set_sort(SortOrder::AlphabeticalTitle);
        assert_eq!(titles(&set), vec!["a", "b"]);
    }

    #[test]
    fn changing_query_drops_active_sort() {
        let mut set = ResultSet::new(vec![
            record("DSA basics", 1, 0),
            record("DSA advanced", 5, 0),
        ]);

        set.set_sort(SortOrder::MoreUpvotes);
        assert_eq!(set.sort(), Some(SortOrder::MoreUpvotes));

        set.set_query("dsa");
        assert_eq!(set.sort(), None);
        // Back to fetch order, not vote order
        assert_eq!(titles(&set), vec!["DSA basics", "DSA advanced"]);
    }
}
