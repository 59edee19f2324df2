use crate::backend::{BackendKind, IntrospectionBackend, exec};
use crate::bus::BusType;
use crate::{DumpOptions, Error, Result, util};

use async_trait::async_trait;

const DBUS_SERVICE: &str = "org.freedesktop.DBus";
const DBUS_PATH: &str = "/org/freedesktop/DBus";

/// `gdbus` backend. No whole-tree rendering, but its per-node introspection
/// output declares child nodes, so it supports the recursive walk strategy.
#[derive(Clone, Debug)]
pub struct Gdbus {
    opts: DumpOptions,
}

impl Gdbus {
    pub fn new(opts: DumpOptions) -> Self {
        Self { opts }
    }

    fn bus_flag(bus: BusType) -> &'static str {
        match bus {
            BusType::System => "--system",
            BusType::Session => "--session",
        }
    }
}

#[async_trait]
impl IntrospectionBackend for Gdbus {
    fn name(&self) -> &'static str {
        "gdbus"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::IntrospectRecursive
    }

    async fn list_names(&self, bus: BusType) -> Result<Vec<String>> {
        // gdbus has no dedicated list command; call ListNames on the bus driver
        // and pick the quoted names out of the GVariant tuple rendering.
        let out = exec::run(
            &self.opts,
            "gdbus",
            "gdbus",
            &[
                "call",
                Self::bus_flag(bus),
                "--dest",
                DBUS_SERVICE,
                "--object-path",
                DBUS_PATH,
                "--method",
                "org.freedesktop.DBus.ListNames",
            ],
        )
        .await?;
        Ok(util::quoted_strings(&out))
    }

    async fn get_tree(&self, _bus: BusType, _service: &str) -> Result<String> {
        Err(Error::BackendUnavailable {
            backend: "gdbus",
            detail: "gdbus has no tree rendering".to_string(),
        })
    }

    async fn introspect(&self, bus: BusType, service: &str, path: &str) -> Result<String> {
        exec::run(
            &self.opts,
            "gdbus",
            "gdbus",
            &[
                "introspect",
                Self::bus_flag(bus),
                "--dest",
                service,
                "--object-path",
                path,
            ],
        )
        .await
    }
}
