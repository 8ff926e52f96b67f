//! Concurrency-safe ordered route storage.
//!
//! # Responsibilities
//! - Keep routes in insertion order
//! - Hand out defensive copies to readers
//! - Delete by stable id, never by position
//!
//! # Design Decisions
//! - One reader-writer lock guards the whole vector
//! - `snapshot` keeps raw stored order for dispatch compilation
//! - `list` renumbers `index` for display; indices are invalid after any mutation
//! - Delete is a linear scan (route counts are small)

use parking_lot::RwLock;

use crate::routing::route::{Route, RoutingError};

/// Ordered store of live routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<Vec<Route>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    ///
    /// Returns a route carrying only the assigned position; the caller
    /// already knows every other field since it supplied them.
    pub fn append(&self, route: Route) -> Route {
        let mut routes = self.routes.write();
        routes.push(route);
        Route {
            index: routes.len() - 1,
            ..Default::default()
        }
    }

    /// Append a route unless its id is already stored.
    ///
    /// The check and the insert happen under one write lock.
    pub fn append_unique(&self, route: Route) -> Result<Route, RoutingError> {
        let mut routes = self.routes.write();
        if routes.iter().any(|r| r.id == route.id) {
            return Err(RoutingError::DuplicateRouteId(route.id));
        }
        routes.push(route);
        Ok(Route {
            index: routes.len() - 1,
            ..Default::default()
        })
    }

    /// Copy of the stored routes in raw order, `index` untouched.
    pub fn snapshot(&self) -> Vec<Route> {
        self.routes.read().clone()
    }

    /// Copy of the stored routes with `index` set to each entry's position.
    pub fn list(&self) -> Vec<Route> {
        let mut routes = self.snapshot();
        for (i, route) in routes.iter_mut().enumerate() {
            route.index = i;
        }
        routes
    }

    /// Look up a single route by id, with its current position.
    pub fn get(&self, id: &str) -> Option<Route> {
        self.list().into_iter().find(|r| r.id == id)
    }

    /// Remove the first route whose id matches.
    pub fn delete(&self, id: &str) -> Result<(), RoutingError> {
        let mut routes = self.routes.write();
        match routes.iter().position(|r| r.id == id) {
            Some(pos) => {
                routes.remove(pos);
                Ok(())
            }
            None => Err(RoutingError::RouteNotFound(id.to_string())),
        }
    }

    /// Number of stored routes.
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn route(id: &str) -> Route {
        Route {
            id: id.into(),
            method: "GET".into(),
            pattern: "/hello".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_returns_position_only() {
        let table = RouteTable::new();
        assert_eq!(table.append(route("r1")).index, 0);
        let second = table.append(route("r2"));
        assert_eq!(second.index, 1);
        assert!(second.id.is_empty());
        assert!(second.pattern.is_empty());
    }

    #[test]
    fn test_append_unique_rejects_live_id() {
        let table = RouteTable::new();
        assert_eq!(table.append_unique(route("r1")).unwrap().index, 0);
        assert_eq!(
            table.append_unique(route("r1")),
            Err(RoutingError::DuplicateRouteId("r1".into()))
        );
        assert_eq!(table.len(), 1);

        // Once deleted, the id is free again.
        table.delete("r1").unwrap();
        assert_eq!(table.append_unique(route("r1")).unwrap().index, 0);
    }

    #[test]
    fn test_list_renumbers_after_delete() {
        let table = RouteTable::new();
        table.append(route("r1"));
        let listed = table.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].index, 0);

        table.append(route("r2"));
        let listed = table.list();
        assert_eq!(listed.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1]);

        table.delete("r1").unwrap();
        let listed = table.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "r2");
        assert_eq!(listed[0].index, 0);
    }

    #[test]
    fn test_snapshot_keeps_stored_index() {
        let table = RouteTable::new();
        let mut r = route("r1");
        r.index = 42;
        table.append(r);
        assert_eq!(table.snapshot()[0].index, 42);
        assert_eq!(table.list()[0].index, 0);
    }

    #[test]
    fn test_reads_are_copies() {
        let table = RouteTable::new();
        table.append(route("r1"));

        let mut snap = table.snapshot();
        snap[0].id = "mutated".into();
        snap.push(route("extra"));

        let mut listed = table.list();
        listed.clear();

        let again = table.list();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].id, "r1");
    }

    #[test]
    fn test_delete_missing_leaves_table_unchanged() {
        let table = RouteTable::new();
        table.append(route("r1"));
        assert_eq!(
            table.delete("nope"),
            Err(RoutingError::RouteNotFound("nope".into()))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_delete_removes_first_match_only() {
        let table = RouteTable::new();
        table.append(route("dup"));
        table.append(route("other"));
        table.append(route("dup"));
        table.delete("dup").unwrap();
        let ids: Vec<_> = table.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["other", "dup"]);
    }

    #[test]
    fn test_get_reports_current_index() {
        let table = RouteTable::new();
        table.append(route("a"));
        table.append(route("b"));
        assert_eq!(table.get("b").map(|r| r.index), Some(1));
        table.delete("a").unwrap();
        assert_eq!(table.get("b").map(|r| r.index), Some(0));
        assert!(table.get("a").is_none());
    }

    #[test]
    fn test_concurrent_appends_and_missing_delete() {
        let table = Arc::new(RouteTable::new());
        let threads: Vec<_> = (0..10)
            .map(|i| {
                let table = table.clone();
                std::thread::spawn(move || {
                    table.append(route(&format!("r{i}")));
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert!(matches!(
            table.delete("missing"),
            Err(RoutingError::RouteNotFound(_))
        ));
        assert_eq!(table.list().len(), 10);
    }

    #[test]
    fn test_concurrent_mixed_mutations_stay_consistent() {
        let table = Arc::new(RouteTable::new());
        for i in 0..50 {
            table.append(route(&format!("seed{i}")));
        }

        let threads: Vec<_> = (0..50)
            .map(|i| {
                let table = table.clone();
                std::thread::spawn(move || {
                    table.append(route(&format!("new{i}")));
                    table.delete(&format!("seed{i}")).is_ok()
                })
            })
            .collect();
        let deleted = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(deleted, 50);
        let listed = table.list();
        assert_eq!(listed.len(), 50);
        assert!(listed.iter().all(|r| r.id.starts_with("new")));
        for (i, r) in listed.iter().enumerate() {
            assert_eq!(r.index, i);
        }
    }
}
