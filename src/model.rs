use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type TodoId = i64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(
        default,
        rename = "dueDate",
        with = "due_date_repr",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn from_items(items: Vec<TodoItem>) -> Self {
        TodoList { items }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn add(&mut self, text: &str, due_date: Option<NaiveDate>) -> Option<TodoId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.items.push(TodoItem {
            id,
            text: trimmed.to_string(),
            completed: false,
            due_date,
        });
        Some(id)
    }

    pub fn toggle(&mut self, id: TodoId) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: TodoId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() < before
    }

    // Wall-clock milliseconds, bumped past the current maximum so ids stay
    // unique even when two adds land in the same millisecond.
    fn next_id(&self) -> TodoId {
        let now = Utc::now().timestamp_millis();
        let max = self.items.iter().map(|item| item.id).max().unwrap_or(0);
        now.max(max + 1)
    }
}

mod due_date_repr {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    // Accepts both a plain date and a full ISO-8601 date-time; only the
    // calendar day survives either way.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(text) => {
                let day = text.split('T').next().unwrap_or(text.as_str());
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn add_appends_incomplete_item_with_trimmed_text() {
        let mut todos = TodoList::default();
        let id = todos.add("  Buy milk  ", None).expect("added");
        assert_eq!(todos.len(), 1);
        let item = todos.get(id).expect("item present");
        assert_eq!(item.text, "Buy milk");
        assert!(!item.completed);
        assert!(item.due_date.is_none());
    }

    #[test]
    fn add_rejects_blank_text() {
        let mut todos = TodoList::default();
        assert!(todos.add("", None).is_none());
        assert!(todos.add("   ", None).is_none());
        assert!(todos.is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut todos = TodoList::default();
        let a = todos.add("one", None).expect("added");
        let b = todos.add("two", None).expect("added");
        let c = todos.add("three", None).expect("added");
        assert!(a < b && b < c);
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut todos = TodoList::default();
        let id = todos.add("laundry", None).expect("added");
        assert!(todos.toggle(id));
        assert!(todos.get(id).expect("item").completed);
        assert!(todos.toggle(id));
        assert!(!todos.get(id).expect("item").completed);
    }

    #[test]
    fn toggle_and_delete_ignore_unknown_ids() {
        let mut todos = TodoList::default();
        let id = todos.add("keep me", None).expect("added");
        assert!(!todos.toggle(id + 1));
        assert!(!todos.delete(id + 1));
        assert_eq!(todos.len(), 1);
        assert!(!todos.get(id).expect("item").completed);
    }

    #[test]
    fn delete_removes_matching_item() {
        let mut todos = TodoList::default();
        let first = todos.add("first", None).expect("added");
        let second = todos.add("second", None).expect("added");
        assert!(todos.delete(first));
        assert_eq!(todos.len(), 1);
        assert_eq!(todos.items()[0].id, second);
    }

    #[test]
    fn order_is_insertion_order_across_toggles() {
        let mut todos = TodoList::default();
        let a = todos.add("a", Some(date(2024, 5, 2))).expect("added");
        let b = todos.add("b", Some(date(2024, 5, 1))).expect("added");
        todos.toggle(a);
        let ids: Vec<TodoId> = todos.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let mut todos = TodoList::default();
        todos.add("dated", Some(date(2024, 3, 15))).expect("added");
        let undated = todos.add("undated", None).expect("added");
        todos.toggle(undated);

        let encoded = serde_json::to_string(todos.items()).expect("encode");
        let decoded: Vec<TodoItem> = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, todos.items().to_vec());
    }

    #[test]
    fn due_date_serializes_as_plain_date() {
        let item = TodoItem {
            id: 1,
            text: "dated".into(),
            completed: false,
            due_date: Some(date(2024, 3, 15)),
        };
        let encoded = serde_json::to_string(&item).expect("encode");
        assert!(encoded.contains("\"dueDate\":\"2024-03-15\""));
    }

    #[test]
    fn due_date_decoder_accepts_full_timestamps() {
        let raw = r#"{"id":7,"text":"call","completed":true,"dueDate":"2024-03-15T18:30:00.000Z"}"#;
        let item: TodoItem = serde_json::from_str(raw).expect("decode");
        assert_eq!(item.due_date, Some(date(2024, 3, 15)));
        assert!(item.completed);
    }

    #[test]
    fn missing_due_date_decodes_as_absent() {
        let raw = r#"{"id":7,"text":"call","completed":false}"#;
        let item: TodoItem = serde_json::from_str(raw).expect("decode");
        assert!(item.due_date.is_none());
    }
}
