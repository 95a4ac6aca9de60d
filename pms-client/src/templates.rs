use pms_model::{StoreError, Template};
use serde_json::Value;

use crate::storage::{Storage, TEMPLATE_LIST_KEY};

/// The user's message templates, kept as one JSON array under
/// [TEMPLATE_LIST_KEY].
///
/// There is no concurrency control: `append` reads the whole list, adds one
/// entry and writes the whole list back, so the last writer wins.
#[derive(Debug, Clone)]
pub struct TemplateStore<S> {
    storage: S,
}

impl<S: Storage> TemplateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The stored array as raw JSON values. Absent data is an empty list;
    /// anything that is not a JSON array is [StoreError::PersistenceCorrupt].
    fn load_raw(&self) -> Result<Vec<Value>, StoreError> {
        let Some(raw) = self.storage.get(TEMPLATE_LIST_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::PersistenceCorrupt {
            key: TEMPLATE_LIST_KEY.to_string(),
            source,
        })
    }

    /// Reads the stored list. Entries that are not templates are skipped;
    /// a stored value that is not a JSON array is an error.
    pub fn try_load(&self) -> Result<Vec<Template>, StoreError> {
        let entries = self.load_raw()?;
        let templates = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(template) => Some(template),
                Err(e) => {
                    log::warn!("skipping stored template {i}: {e}");
                    None
                }
            })
            .collect();
        Ok(templates)
    }

    /// The stored templates in insertion order. Never fails: unreadable or
    /// corrupt data yields an empty list.
    pub fn load(&self) -> Vec<Template> {
        self.try_load().unwrap_or_else(|e| {
            log::warn!("discarding stored templates: {e}");
            Vec::new()
        })
    }

    /// Adds `template` at the end of the stored array. Entries this store
    /// cannot read are written back unchanged; only a stored value that is
    /// not a JSON array is replaced.
    pub fn append(&self, template: Template) -> Result<(), StoreError> {
        let serialize_error = |source| StoreError::Serialize {
            key: TEMPLATE_LIST_KEY.to_string(),
            source,
        };
        let mut entries = self.load_raw().unwrap_or_else(|e| {
            log::warn!("replacing stored templates: {e}");
            Vec::new()
        });
        entries.push(serde_json::to_value(&template).map_err(serialize_error)?);
        let raw = serde_json::to_string(&entries).map_err(serialize_error)?;
        self.storage.set(TEMPLATE_LIST_KEY, &raw)
    }

    pub fn get(&self, index: usize) -> Option<Template> {
        self.load().into_iter().nth(index)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(TEMPLATE_LIST_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use test_log::test;

    #[test]
    fn test_append_and_load() {
        let store = TemplateStore::new(MemoryStorage::new());
        assert!(store.load().is_empty());

        store.append(Template::new("Standup", "What did you do?", Some(1))).unwrap();
        store.append(Template::new("Retro", "What went well?", None)).unwrap();

        let templates = store.load();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].title, "Standup");
        assert_eq!(templates[1], Template::new("Retro", "What went well?", None));
        assert_eq!(store.get(1).map(|t| t.title), Some("Retro".to_string()));
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn test_corrupt_data() {
        let storage = MemoryStorage::new();
        storage.set(TEMPLATE_LIST_KEY, "{not json").unwrap();
        let store = TemplateStore::new(storage);

        assert!(matches!(
            store.try_load(),
            Err(StoreError::PersistenceCorrupt { .. })
        ));
        assert!(store.load().is_empty());

        // the corrupt list is replaced on the next append
        store.append(Template::new("a", "b", None)).unwrap();
        assert_eq!(store.load(), vec![Template::new("a", "b", None)]);
    }

    #[test]
    fn test_off_shape_entries_are_kept() {
        let storage = MemoryStorage::new();
        storage
            .set(
                TEMPLATE_LIST_KEY,
                r#"[{"title":"Standup","body":"What did you do?","project":"2"},{"title":"Retro","body":"went well"}]"#,
            )
            .unwrap();
        let store = TemplateStore::new(storage);

        // only the entry with a string project is unreadable
        assert_eq!(store.load(), vec![Template::new("Retro", "went well", None)]);

        store.append(Template::new("New", "x", Some(1))).unwrap();
        let raw: Vec<Value> =
            serde_json::from_str(&store.storage.get(TEMPLATE_LIST_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0]["project"], "2");
        assert_eq!(
            store.load(),
            vec![
                Template::new("Retro", "went well", None),
                Template::new("New", "x", Some(1)),
            ]
        );
    }

    #[test]
    fn test_clear() {
        let store = TemplateStore::new(MemoryStorage::new());
        store.append(Template::new("a", "b", None)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_shared_storage() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let first = TemplateStore::new(storage.clone());
        let second = TemplateStore::new(storage);
        first.append(Template::new("a", "b", None)).unwrap();
        second.append(Template::new("c", "d", None)).unwrap();
        assert_eq!(first.load().len(), 2);
    }
}
