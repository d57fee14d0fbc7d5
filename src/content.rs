//! Admin-managed content collections: announcements, cabinet, faculty,
//! programs, degrees and gallery albums are all the same thin CRUD shape,
//! so they share one schemaless wrapper. Records are JSON objects keyed by
//! an injected `id`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{keys, Store};

pub struct ContentCollection {
    store: Arc<Store>,
    key: &'static str,
    defaults: Vec<Value>,
}

impl ContentCollection {
    pub fn new(store: Arc<Store>, key: &'static str) -> Self {
        Self {
            store,
            key,
            defaults: Vec::new(),
        }
    }

    /// Collection that serves default content while nothing has been
    /// stored yet. Defaults are never written back implicitly.
    pub fn with_defaults(store: Arc<Store>, key: &'static str, defaults: Vec<Value>) -> Self {
        Self {
            store,
            key,
            defaults,
        }
    }

    pub fn list(&self) -> Vec<Value> {
        self.store
            .get(self.key)
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.list().into_iter().find(|item| item_id(item) == Some(id))
    }

    pub fn create(&self, item: Value) -> Result<Value, AppError> {
        let Value::Object(mut fields) = item else {
            return Err(AppError::Validation("Content records must be JSON objects.".to_string()));
        };
        fields.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        let item = Value::Object(fields);

        let mut items = self.list();
        items.insert(0, item.clone());
        self.store.set(self.key, &items)?;
        Ok(item)
    }

    /// Shallow merge of `patch` over the stored record; the id is
    /// preserved.
    pub fn update(&self, id: &str, patch: Value) -> Result<Value, AppError> {
        let Value::Object(patch) = patch else {
            return Err(AppError::Validation("Content records must be JSON objects.".to_string()));
        };

        let mut items = self.list();
        let idx = items
            .iter()
            .position(|item| item_id(item) == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Record '{}' was not found.", id)))?;

        let fields = items[idx]
            .as_object_mut()
            .ok_or_else(|| AppError::Storage(format!("Corrupt record in '{}'.", self.key)))?;
        for (k, v) in patch {
            fields.insert(k, v);
        }
        fields.insert("id".to_string(), json!(id));

        let updated = items[idx].clone();
        self.store.set(self.key, &items)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut items = self.list();
        let before = items.len();
        items.retain(|item| item_id(item) != Some(id));
        if items.len() == before {
            return Ok(false);
        }
        self.store.set(self.key, &items)?;
        Ok(true)
    }
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

/// All content surfaces of the portal plus the theme map.
pub struct SocietyContent {
    pub announcements: ContentCollection,
    pub cabinet: ContentCollection,
    pub faculty: ContentCollection,
    pub programs: ContentCollection,
    pub degrees: ContentCollection,
    pub gallery_albums: ContentCollection,
    pub home: ContentCollection,
    store: Arc<Store>,
}

impl SocietyContent {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            announcements: ContentCollection::with_defaults(
                store.clone(),
                keys::ANNOUNCEMENTS,
                default_announcements(),
            ),
            cabinet: ContentCollection::new(store.clone(), keys::CABINET),
            faculty: ContentCollection::new(store.clone(), keys::FACULTY),
            programs: ContentCollection::new(store.clone(), keys::PROGRAMS),
            degrees: ContentCollection::new(store.clone(), keys::DEGREES),
            gallery_albums: ContentCollection::new(store.clone(), keys::GALLERY_ALBUMS),
            home: ContentCollection::new(store.clone(), keys::HOME_CONTENT),
            store,
        }
    }

    /// Flat mapping of named color roles to values, consumed by the UI
    /// shell.
    pub fn theme(&self) -> BTreeMap<String, String> {
        self.store.get_or(keys::THEME, default_theme())
    }

    pub fn set_theme(&self, theme: &BTreeMap<String, String>) -> Result<(), AppError> {
        self.store.set(keys::THEME, theme)
    }
}

fn default_announcements() -> Vec<Value> {
    vec![
        json!({
            "id": "ann-1",
            "title": "Tech & Entrepreneurship Summit 4.0",
            "body": "Join us for the biggest tech event of the year! Register now to secure your spot.",
            "date": "2024-12-25",
            "priority": "urgent",
            "tags": ["Event", "Summit"]
        }),
        json!({
            "id": "ann-2",
            "title": "New Library Resources Available",
            "body": "The department library has acquired new books and digital resources.",
            "date": "2024-12-20",
            "priority": "normal",
            "tags": ["Library", "Resources"]
        }),
    ]
}

fn default_theme() -> BTreeMap<String, String> {
    [
        ("Accent Red", "#dc2743"),
        ("Accent Magenta", "#c234a5"),
        ("Accent Cyan", "#00d9ff"),
        ("Background", "#0f0f1a"),
        ("Muted Text", "#9a8fa6"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
