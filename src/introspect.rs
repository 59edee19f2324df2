//! Per-path object introspection.

use crate::backend::IntrospectionBackend;
use crate::bus::BusType;

/// Outcome of introspecting one (service, path) pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Introspection {
    /// Raw catalog text as the winning tool printed it. Kept opaque; consumers
    /// may parse interfaces/methods/properties out of it later.
    Catalog(String),
    /// Every backend failed for this path. Reported per path, never fatal.
    Unavailable,
}

/// Try each backend in priority order for a single-path introspection; the
/// first one to return successfully wins.
pub async fn introspect_path(
    backends: &[Box<dyn IntrospectionBackend>],
    bus: BusType,
    service: &str,
    path: &str,
) -> Introspection {
    for backend in backends {
        match backend.introspect(bus, service, path).await {
            Ok(text) => return Introspection::Catalog(text),
            Err(e) => {
                tracing::debug!(
                    backend = backend.name(),
                    service,
                    path,
                    error = %e,
                    "introspection attempt failed"
                );
            }
        }
    }
    Introspection::Unavailable
}
