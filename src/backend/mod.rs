//! Introspection oracles: external D-Bus CLI tools driven as subprocesses.
//!
//! Three tools are supported, ranked by fidelity: `busctl` renders a complete
//! object tree in one invocation, `gdbus` introspects one node (with its
//! declared children) at a time, and `dbus-send` issues raw `Introspect` calls
//! as a last resort. Wire-level message parsing is out of scope; these tools
//! are the only bus access the crate has.

mod busctl;
mod dbus_send;
mod exec;
mod gdbus;

pub use busctl::Busctl;
pub use dbus_send::DbusSend;
pub use gdbus::Gdbus;

use async_trait::async_trait;

use crate::bus::BusType;
use crate::{DumpOptions, Error, Result};

/// Backend fidelity classes, highest first.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum BackendKind {
    /// Can render a service's whole object tree in one call (`busctl tree`).
    TreeCapable,
    /// Can introspect one node at a time, including declared child nodes.
    IntrospectRecursive,
    /// Raw method calls only (`dbus-send`).
    SimpleCall,
}

/// One external introspection tool.
///
/// Every method maps to a single subprocess invocation bounded by
/// `DumpOptions::invoke_timeout`. Operations a tool cannot perform return
/// `Error::BackendUnavailable` so callers fall through to the next backend.
#[async_trait]
pub trait IntrospectionBackend: Send + Sync {
    /// Tool name, for diagnostics.
    fn name(&self) -> &'static str;

    fn kind(&self) -> BackendKind;

    /// Parsed bus names (well-known and unique) currently on the bus.
    async fn list_names(&self, bus: BusType) -> Result<Vec<String>>;

    /// Raw rendered object tree for one service (tree-capable tools only).
    async fn get_tree(&self, bus: BusType, service: &str) -> Result<String>;

    /// Raw interface/method/property catalog for one (service, path) pair.
    async fn introspect(&self, bus: BusType, service: &str, path: &str) -> Result<String>;
}

pub type BackendList = Vec<Box<dyn IntrospectionBackend>>;

/// Probe the host for installed tools and return backends in priority order.
///
/// Probes `PATH` only; no bus traffic. An empty result is fatal for the run.
pub fn detect(opts: &DumpOptions) -> Result<BackendList> {
    let kinds = select(
        binary_on_path("busctl"),
        binary_on_path("gdbus"),
        binary_on_path("dbus-send"),
    );
    if kinds.is_empty() {
        return Err(Error::NoBackendAvailable);
    }
    tracing::debug!(?kinds, "detected introspection backends");
    Ok(kinds.into_iter().map(|k| instantiate(k, opts)).collect())
}

/// Priority selection over the detected tool set. Pure, so the ordering is
/// testable without a host probe.
fn select(busctl: bool, gdbus: bool, dbus_send: bool) -> Vec<BackendKind> {
    let mut kinds = Vec::new();
    if busctl {
        kinds.push(BackendKind::TreeCapable);
    }
    if gdbus {
        kinds.push(BackendKind::IntrospectRecursive);
    }
    if dbus_send {
        kinds.push(BackendKind::SimpleCall);
    }
    kinds
}

fn instantiate(kind: BackendKind, opts: &DumpOptions) -> Box<dyn IntrospectionBackend> {
    match kind {
        BackendKind::TreeCapable => Box::new(Busctl::new(opts.clone())),
        BackendKind::IntrospectRecursive => Box::new(Gdbus::new(opts.clone())),
        BackendKind::SimpleCall => Box::new(DbusSend::new(opts.clone())),
    }
}

fn binary_on_path(program: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| is_executable(&dir.join(program)))
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
