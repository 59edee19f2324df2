//! Service enumeration.

use crate::backend::IntrospectionBackend;
use crate::bus::BusType;
use crate::{Error, Result};

use std::collections::BTreeSet;

/// List documentable service names on the bus: deduplicated, sorted, with
/// ephemeral unique-connection names (`:1.42`) excluded.
///
/// The first backend whose list operation works wins. A missing tool falls
/// through to the next backend; any other failure is `BusUnreachable` — there
/// is no meaningful fallback for enumeration itself.
pub async fn list_services(
    backends: &[Box<dyn IntrospectionBackend>],
    bus: BusType,
) -> Result<Vec<String>> {
    for backend in backends {
        match backend.list_names(bus).await {
            Ok(names) => {
                let set: BTreeSet<String> = names
                    .into_iter()
                    .filter(|n| !n.is_empty() && !n.starts_with(':'))
                    .collect();
                tracing::debug!(
                    backend = backend.name(),
                    bus = %bus,
                    count = set.len(),
                    "enumerated services"
                );
                return Ok(set.into_iter().collect());
            }
            Err(e @ Error::BackendUnavailable { .. }) => {
                tracing::debug!(backend = backend.name(), error = %e, "list names unavailable");
            }
            Err(e) => {
                return Err(Error::BusUnreachable {
                    detail: format!("{} list failed: {e}", backend.name()),
                });
            }
        }
    }

    Err(Error::BusUnreachable {
        detail: "no backend could list bus names".to_string(),
    })
}
