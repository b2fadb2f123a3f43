//! Startup table of route policies.

use crate::config::CsrfConfig;
use crate::marker::{ActionMeta, ControllerMeta, CsrfMarker, RouteKey};
use crate::spec::CsrfSpec;
use std::collections::HashMap;
use tracing::debug;

/// Resolved policies keyed by route.
///
/// Built once from controller and action markers against a configuration
/// snapshot, then shared read-only by every request.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    global: CsrfSpec,
    controllers: HashMap<String, CsrfSpec>,
    routes: HashMap<RouteKey, CsrfSpec>,
}

impl SpecRegistry {
    pub fn builder(config: CsrfConfig) -> SpecRegistryBuilder {
        SpecRegistryBuilder {
            config,
            controllers: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Registry with no routes; every lookup yields the global policy.
    pub fn global_only(config: &CsrfConfig) -> Self {
        Self {
            global: CsrfSpec::global(config),
            controllers: HashMap::new(),
            routes: HashMap::new(),
        }
    }

    /// Policy for a route. Unknown actions fall back to their controller,
    /// unknown controllers to the global policy.
    pub fn spec_for(&self, controller: &str, action: &str) -> &CsrfSpec {
        self.routes
            .get(&RouteKey::new(controller, action))
            .or_else(|| self.controllers.get(controller))
            .unwrap_or(&self.global)
    }

    pub fn global(&self) -> &CsrfSpec {
        &self.global
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects route markers for a [`SpecRegistry`].
#[derive(Debug)]
pub struct SpecRegistryBuilder {
    config: CsrfConfig,
    controllers: Vec<ControllerMeta>,
    actions: Vec<ActionMeta>,
}

impl SpecRegistryBuilder {
    pub fn controller(mut self, name: impl Into<String>, marker: CsrfMarker) -> Self {
        self.controllers
            .push(ControllerMeta::new(name).with_csrf(marker));
        self
    }

    pub fn action(
        mut self,
        controller: impl Into<String>,
        action: impl Into<String>,
        marker: CsrfMarker,
    ) -> Self {
        self.actions
            .push(ActionMeta::new(controller, action).with_csrf(marker));
        self
    }

    pub fn controller_meta(mut self, meta: ControllerMeta) -> Self {
        self.controllers.push(meta);
        self
    }

    pub fn action_meta(mut self, meta: ActionMeta) -> Self {
        self.actions.push(meta);
        self
    }

    pub fn build(self) -> SpecRegistry {
        let global = CsrfSpec::global(&self.config);

        let controllers: HashMap<String, CsrfSpec> = self
            .controllers
            .iter()
            .map(|meta| {
                let spec = CsrfSpec::for_controller(meta, &self.config).chain(global.clone());
                (meta.name.clone(), spec)
            })
            .collect();

        let routes: HashMap<RouteKey, CsrfSpec> = self
            .actions
            .iter()
            .map(|meta| {
                let parent = controllers
                    .get(&meta.controller)
                    .cloned()
                    .unwrap_or_else(|| global.clone());
                let spec = CsrfSpec::for_action(meta, &self.config).chain(parent);
                debug!(route = %meta.route_key(), enabled = spec.is_enabled(), "CSRF policy resolved");
                (meta.route_key(), spec)
            })
            .collect();

        SpecRegistry {
            global,
            controllers,
            routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(config: CsrfConfig) -> SpecRegistry {
        SpecRegistry::builder(config)
            .controller("Api", CsrfMarker::Disable)
            .controller("Admin", CsrfMarker::Enable)
            .action("Api", "upload", CsrfMarker::Enable)
            .action("Admin", "webhook", CsrfMarker::Disable)
            .action("Orders", "create", CsrfMarker::Unspecified)
            .build()
    }

    #[test]
    fn test_action_marker_wins() {
        let registry = registry(CsrfConfig::generate());
        assert!(registry.spec_for("Api", "upload").is_enabled());
        assert!(!registry.spec_for("Admin", "webhook").is_enabled());
    }

    #[test]
    fn test_controller_marker_applies_to_unmarked_actions() {
        let registry = registry(CsrfConfig::generate().with_enabled(false));
        assert!(!registry.spec_for("Api", "list").is_enabled());
        assert!(registry.spec_for("Admin", "list").is_enabled());
    }

    #[test]
    fn test_unmarked_routes_follow_global() {
        let on = registry(CsrfConfig::generate());
        assert!(on.spec_for("Orders", "create").is_enabled());
        assert!(on.spec_for("Unknown", "index").is_enabled());
        assert_eq!(on.spec_for("Unknown", "index"), on.global());

        let off = registry(CsrfConfig::generate().with_enabled(false));
        assert!(!off.spec_for("Orders", "create").is_enabled());
        assert!(!off.spec_for("Unknown", "index").is_enabled());
    }

    #[test]
    fn test_cached_spec_is_shared() {
        let registry = registry(CsrfConfig::generate());
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.spec_for("Orders", "create"),
            registry.spec_for("Orders", "create")
        );
    }

    #[test]
    fn test_global_only() {
        let registry = SpecRegistry::global_only(&CsrfConfig::generate());
        assert!(registry.is_empty());
        assert!(registry.spec_for("Any", "thing").is_enabled());
    }
}
