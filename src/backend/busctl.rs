use crate::backend::{BackendKind, IntrospectionBackend, exec};
use crate::bus::BusType;
use crate::{DumpOptions, Result};

use async_trait::async_trait;

/// `busctl` backend. The only tool that renders a service's whole object tree
/// in one invocation, which makes it the highest-fidelity path-discovery
/// oracle.
#[derive(Clone, Debug)]
pub struct Busctl {
    opts: DumpOptions,
}

impl Busctl {
    pub fn new(opts: DumpOptions) -> Self {
        Self { opts }
    }

    fn bus_flag(bus: BusType) -> &'static str {
        match bus {
            BusType::System => "--system",
            // busctl addresses the session bus through its --user mode.
            BusType::Session => "--user",
        }
    }
}

#[async_trait]
impl IntrospectionBackend for Busctl {
    fn name(&self) -> &'static str {
        "busctl"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::TreeCapable
    }

    async fn list_names(&self, bus: BusType) -> Result<Vec<String>> {
        let out = exec::run(
            &self.opts,
            "busctl",
            "busctl",
            &[Self::bus_flag(bus), "list", "--no-legend", "--no-pager"],
        )
        .await?;
        Ok(parse_list(&out))
    }

    async fn get_tree(&self, bus: BusType, service: &str) -> Result<String> {
        exec::run(
            &self.opts,
            "busctl",
            "busctl",
            &[Self::bus_flag(bus), "tree", service, "--no-pager"],
        )
        .await
    }

    async fn introspect(&self, bus: BusType, service: &str, path: &str) -> Result<String> {
        exec::run(
            &self.opts,
            "busctl",
            "busctl",
            &[Self::bus_flag(bus), "introspect", service, path, "--no-pager"],
        )
        .await
    }
}

/// First column of `busctl list` output. Tolerates a legend line even though
/// `--no-legend` should suppress it.
fn parse_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| !name.is_empty() && *name != "NAME")
        .map(str::to_string)
        .collect()
}
