//! Per-template cache of parsed definition graphs.
//!
//! Template definitions are JSON blobs. The engine walks them on every
//! auto-flow pass, so they are parsed once into a
//! [`TemplateGraph`](oversight_core::graph::TemplateGraph) and cached
//! keyed by template id, invalidated when the stored version changes or
//! the template is updated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use oversight_core::error::CoreError;
use oversight_core::graph::TemplateGraph;
use oversight_core::types::DbId;
use oversight_db::models::workflow::WorkflowTemplate;

#[derive(Debug)]
struct CachedGraph {
    version: String,
    graph: Arc<TemplateGraph>,
}

/// Thread-safe graph cache shared across service clones.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    inner: Arc<Mutex<HashMap<DbId, CachedGraph>>>,
}

impl GraphCache {
    /// Return the cached graph for a template, parsing and caching it on
    /// a miss or when the stored version no longer matches.
    pub fn get_or_parse(&self, template: &WorkflowTemplate) -> Result<Arc<TemplateGraph>, CoreError> {
        let mut map = self.lock();
        if let Some(cached) = map.get(&template.id) {
            if cached.version == template.version {
                return Ok(Arc::clone(&cached.graph));
            }
        }

        let graph = Arc::new(TemplateGraph::parse(&template.definition)?);
        map.insert(
            template.id,
            CachedGraph {
                version: template.version.clone(),
                graph: Arc::clone(&graph),
            },
        );
        Ok(graph)
    }

    /// Drop the cached graph for a template (after update or delete).
    pub fn invalidate(&self, template_id: DbId) {
        self.lock().remove(&template_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DbId, CachedGraph>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself stays consistent.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn template(id: DbId, version: &str, definition: serde_json::Value) -> WorkflowTemplate {
        WorkflowTemplate {
            id,
            name: "t".into(),
            code: "T".into(),
            description: None,
            template_type: "supervision".into(),
            version: version.into(),
            is_enabled: true,
            is_builtin: false,
            definition,
            form_config: None,
            permission_config: None,
            notification_config: None,
            sort_order: 0,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cache_hit_returns_same_graph() {
        let cache = GraphCache::default();
        let t = template(1, "1.0", json!({"nodes": [], "transitions": []}));
        let a = cache.get_or_parse(&t).unwrap();
        let b = cache.get_or_parse(&t).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_version_change_reparses() {
        let cache = GraphCache::default();
        let v1 = template(1, "1.0", json!({"nodes": [], "transitions": []}));
        let a = cache.get_or_parse(&v1).unwrap();

        let v2 = template(
            1,
            "1.1",
            json!({"nodes": [{"id": "s", "name": "S", "type": "start"}], "transitions": []}),
        );
        let b = cache.get_or_parse(&v2).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_invalidate_drops_entry() {
        let cache = GraphCache::default();
        let t = template(1, "1.0", json!({"nodes": [], "transitions": []}));
        let a = cache.get_or_parse(&t).unwrap();
        cache.invalidate(1);
        let b = cache.get_or_parse(&t).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
