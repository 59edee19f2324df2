//! Orchestration: drives backends -> enumeration -> per-service discovery ->
//! per-path introspection -> document assembly.

use crate::backend::{self, IntrospectionBackend};
use crate::bus::BusType;
use crate::discover::{self, DiscoveryMethod};
use crate::document::DumpDocument;
use crate::introspect::{self, Introspection};
use crate::options::DumpOptions;
use crate::{Error, Result, services, util};

use std::collections::BTreeMap;

/// Run a full dump: detect backends on the host, then snapshot either one
/// requested service or every service on the bus.
///
/// Fatal errors (no backend, bus unreachable, zero services) abort the run;
/// per-service and per-path failures degrade to document markers.
pub async fn run(bus: BusType, service: Option<&str>, opts: &DumpOptions) -> Result<DumpDocument> {
    let backends = backend::detect(opts)?;
    run_with_backends(&backends, bus, service, opts).await
}

/// Like [`run`], but over an explicit backend list. Exposed so the pipeline
/// can be driven with stub backends.
pub async fn run_with_backends(
    backends: &[Box<dyn IntrospectionBackend>],
    bus: BusType,
    service: Option<&str>,
    opts: &DumpOptions,
) -> Result<DumpDocument> {
    let services = match service {
        Some(name) => {
            util::validate_service_name(name)?;
            vec![name.to_string()]
        }
        None => {
            let listed = services::list_services(backends, bus).await?;
            if listed.is_empty() {
                return Err(Error::NoServices { bus: bus.as_str() });
            }
            listed
        }
    };

    tracing::info!(bus = %bus, services = services.len(), "starting dump");

    let mut doc = DumpDocument::new();
    for service in &services {
        let discovery = discover::discover_paths(backends, bus, service, opts).await;
        match discovery.method {
            DiscoveryMethod::Heuristic => {
                tracing::warn!(service = %service, "path discovery fell back to a name-derived guess");
            }
            _ if discovery.paths.is_empty() => {
                tracing::warn!(service = %service, "no object paths found");
            }
            _ => {
                tracing::debug!(
                    service = %service,
                    method = ?discovery.method,
                    paths = discovery.paths.len(),
                    "paths discovered"
                );
            }
        }

        let mut objects = BTreeMap::new();
        for path in &discovery.paths {
            let result = introspect::introspect_path(backends, bus, service, path).await;
            if result == Introspection::Unavailable {
                tracing::warn!(service = %service, path = %path, "introspection unavailable");
            }
            objects.insert(path.clone(), result);
        }

        doc.add_service(service, &discovery, objects);
    }

    tracing::info!(services = doc.dump.len(), "dump assembled");
    Ok(doc)
}

/// Drive a full dump to completion on the embedded runtime, for the CLI and
/// other blocking callers.
pub fn run_blocking(bus: BusType, service: Option<&str>, opts: &DumpOptions) -> Result<DumpDocument> {
    crate::runtime::block_on_result(run(bus, service, opts))
}
