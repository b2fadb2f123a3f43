//! Per-route CSRF override markers.
//!
//! Controllers and actions declare whether they force protection on, force
//! it off, or leave the decision to the global configuration. Markers are
//! read once, when routes are registered.

use std::fmt;

/// Explicit per-route override of the global CSRF switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CsrfMarker {
    /// Always protect this route.
    Enable,
    /// Never protect this route.
    Disable,
    /// Follow the global configuration.
    #[default]
    Unspecified,
}

impl CsrfMarker {
    /// Marker from a pair of enable/disable flags. Disable wins when both
    /// are set.
    pub fn from_flags(enable: bool, disable: bool) -> Self {
        if disable {
            CsrfMarker::Disable
        } else if enable {
            CsrfMarker::Enable
        } else {
            CsrfMarker::Unspecified
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, CsrfMarker::Unspecified)
    }
}

/// Controller-level route metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMeta {
    pub name: String,
    pub csrf: CsrfMarker,
}

impl ControllerMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            csrf: CsrfMarker::Unspecified,
        }
    }

    pub fn with_csrf(mut self, marker: CsrfMarker) -> Self {
        self.csrf = marker;
        self
    }
}

/// Action-level route metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMeta {
    pub controller: String,
    pub name: String,
    pub csrf: CsrfMarker,
}

impl ActionMeta {
    pub fn new(controller: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            name: name.into(),
            csrf: CsrfMarker::Unspecified,
        }
    }

    pub fn with_csrf(mut self, marker: CsrfMarker) -> Self {
        self.csrf = marker;
        self
    }

    pub fn route_key(&self) -> RouteKey {
        RouteKey::new(self.controller.clone(), self.name.clone())
    }
}

/// Lookup key for a resolved route policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub controller: String,
    pub action: String,
}

impl RouteKey {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_wins() {
        assert_eq!(CsrfMarker::from_flags(true, true), CsrfMarker::Disable);
        assert_eq!(CsrfMarker::from_flags(true, false), CsrfMarker::Enable);
        assert_eq!(CsrfMarker::from_flags(false, true), CsrfMarker::Disable);
        assert_eq!(CsrfMarker::from_flags(false, false), CsrfMarker::Unspecified);
    }

    #[test]
    fn test_default_is_unspecified() {
        assert!(!CsrfMarker::default().is_specified());
        assert_eq!(ControllerMeta::new("Orders").csrf, CsrfMarker::Unspecified);
    }

    #[test]
    fn test_route_key() {
        let meta = ActionMeta::new("Orders", "create").with_csrf(CsrfMarker::Enable);
        assert_eq!(meta.route_key(), RouteKey::new("Orders", "create"));
        assert_eq!(meta.route_key().to_string(), "Orders.create");
    }
}
