//! Static service registry resolved once at startup.
//!
//! [`ServiceRegistry`] maps a logical service name to its
//! [`ServiceDescriptor`](crate::config::model::ServiceDescriptor). It is
//! populated from validated config at process start and read-only
//! thereafter. [`ServiceRegistry::all`] preserves config declaration
//! order, and that order is stable for the process lifetime — the
//! fan-out aggregator's merged-body ordering depends on it.

use std::collections::HashMap;

use crate::config::model::ServiceDescriptor;

#[derive(Debug)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ServiceRegistry {
    /// Build a registry from validated config. Names are assumed unique
    /// (enforced by [`validation`](crate::config::validation)).
    #[must_use]
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        let by_name = services
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.name.clone(), idx))
            .collect();
        Self { services, by_name }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.by_name.get(name).map(|&idx| &self.services[idx])
    }

    /// All registered services in declaration order.
    #[must_use]
    pub fn all(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.into(),
            host: "127.0.0.1".into(),
            port,
            forward_path: "/api/test".into(),
        }
    }

    fn registry() -> ServiceRegistry {
        ServiceRegistry::new(vec![
            descriptor("service1", 9091),
            descriptor("service2", 9092),
            descriptor("service3", 9093),
        ])
    }

    #[test]
    fn resolve_finds_registered_service() {
        let reg = registry();
        let svc = reg.resolve("service2").unwrap();
        assert_eq!(svc.port, 9092);
        assert_eq!(svc.authority(), "127.0.0.1:9092");
    }

    #[test]
    fn resolve_unknown_returns_none() {
        assert!(registry().resolve("service9").is_none());
    }

    #[test]
    fn all_preserves_declaration_order() {
        let reg = registry();
        let names: Vec<&str> = reg.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["service1", "service2", "service3"]);
        // Stable across calls
        let again: Vec<&str> = reg.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn names_match_all() {
        let reg = registry();
        assert_eq!(reg.names(), vec!["service1", "service2", "service3"]);
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_empty());
    }
}
