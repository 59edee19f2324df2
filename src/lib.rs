//! dbusdump snapshots a live D-Bus bus into one structured YAML document: it
//! enumerates every reachable service, reconstructs each service's object-path
//! tree through a chain of fallback strategies, introspects every object path,
//! and serializes the whole topology with stable ordering.
//!
//! Bus access goes exclusively through external CLI tools treated as oracles
//! (`busctl`, `gdbus`, `dbus-send`), tried in fidelity order; this crate never
//! speaks the wire protocol itself. Restricted bus access degrades to explicit
//! markers in the document instead of failing the run.
//!
//! ## Quick start
//! ```no_run
//! use dbusdump::{BusType, DumpOptions};
//!
//! async fn snapshot() -> Result<(), dbusdump::Error> {
//!     let opts = DumpOptions::default();
//!     let doc = dbusdump::run(BusType::System, None, &opts).await?;
//!     doc.write_to(std::path::Path::new("dbus_dump.yaml"), BusType::System)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Degradation rules
//! - No introspection tool installed, bus unreachable, or zero services: the
//!   run fails.
//! - Path discovery failing for one service, or introspection failing for one
//!   path: the document records an explicit marker and the run continues.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::dbg_macro)]

#[cfg(all(feature = "rt-async-io", feature = "rt-tokio"))]
compile_error!("features `rt-async-io` and `rt-tokio` are mutually exclusive; enable exactly one.");

#[cfg(not(any(feature = "rt-async-io", feature = "rt-tokio")))]
compile_error!(
    "missing runtime feature: enable one of `rt-async-io` or `rt-tokio` (default enables `rt-async-io`)."
);

mod backend;
mod bus;
mod cli;
mod discover;
mod document;
mod dump;
mod error;
mod introspect;
mod options;
mod runtime;
mod services;
mod util;

pub use crate::backend::{
    BackendKind, BackendList, Busctl, DbusSend, Gdbus, IntrospectionBackend, detect,
};
pub use crate::bus::BusType;
pub use crate::cli::{Cli, DEFAULT_OUTPUT};
pub use crate::discover::{Discovery, DiscoveryMethod, discover_paths};
pub use crate::document::{
    DumpDocument, HEURISTIC_TREE_MARKER, INTROSPECTION_UNAVAILABLE_MARKER, NO_PATHS_MARKER,
    NO_TREE_MARKER, ObjectEntry, ServiceEntry,
};
pub use crate::dump::{run, run_blocking, run_with_backends};
pub use crate::error::{Error, Result};
pub use crate::introspect::{Introspection, introspect_path};
pub use crate::options::DumpOptions;
pub use crate::services::list_services;
