//! Object-path discovery.
//!
//! Three strategies, tried in strict priority order with no merging across
//! them: a whole-tree query on a tree-capable tool, a recursive introspection
//! walk from the root, and finally a guess synthesized from the service name.

use crate::backend::{BackendKind, IntrospectionBackend};
use crate::bus::BusType;
use crate::introspect::{Introspection, introspect_path};
use crate::options::DumpOptions;
use crate::util;

use std::collections::BTreeSet;

/// Which strategy produced a path set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiscoveryMethod {
    /// Whole-tree query (`busctl tree`).
    Tree,
    /// Recursive introspection walk from `/`.
    Walk,
    /// Paths guessed from the service name; best effort, not a discovery result.
    Heuristic,
}

/// Result of path discovery for one service.
#[derive(Clone, Debug)]
pub struct Discovery {
    /// Discovered object paths, sorted. May be empty when a tree query
    /// succeeded but reported no objects.
    pub paths: BTreeSet<String>,
    /// Raw tree rendering, when the tree strategy produced one.
    pub tree: Option<String>,
    pub method: DiscoveryMethod,
}

/// Reconstruct the object-path set of one service.
///
/// Never fatal: exhausting every strategy yields the heuristic guess, and the
/// caller decides how loudly to report that.
pub async fn discover_paths(
    backends: &[Box<dyn IntrospectionBackend>],
    bus: BusType,
    service: &str,
    opts: &DumpOptions,
) -> Discovery {
    if let Some(backend) = backends.iter().find(|b| b.kind() == BackendKind::TreeCapable) {
        match backend.get_tree(bus, service).await {
            Ok(text) => {
                // An empty but successful tree result is valid: the service
                // exposes no objects.
                let paths = parse_tree_paths(&text);
                tracing::debug!(
                    service,
                    backend = backend.name(),
                    count = paths.len(),
                    "tree query succeeded"
                );
                return Discovery {
                    paths,
                    tree: Some(text),
                    method: DiscoveryMethod::Tree,
                };
            }
            Err(e) => {
                tracing::debug!(service, backend = backend.name(), error = %e, "tree query failed");
            }
        }
    }

    if let Some(paths) = walk(backends, bus, service, opts).await {
        tracing::debug!(service, count = paths.len(), "recursive walk succeeded");
        return Discovery {
            paths,
            tree: None,
            method: DiscoveryMethod::Walk,
        };
    }

    Discovery {
        paths: heuristic_paths(service),
        tree: None,
        method: DiscoveryMethod::Heuristic,
    }
}

/// Worklist-based recursive introspection from `/`.
///
/// Returns `None` when the root itself cannot be introspected (the strategy
/// failed); otherwise every path whose introspection succeeded. A failing
/// non-root node terminates its branch silently.
async fn walk(
    backends: &[Box<dyn IntrospectionBackend>],
    bus: BusType,
    service: &str,
    opts: &DumpOptions,
) -> Option<BTreeSet<String>> {
    let mut discovered = BTreeSet::new();
    let mut pending = vec!["/".to_string()];

    while let Some(path) = pending.pop() {
        if discovered.contains(&path) {
            continue;
        }
        if discovered.len() >= opts.max_walk_nodes {
            tracing::warn!(
                service,
                limit = opts.max_walk_nodes,
                "walk node limit reached; path set may be incomplete"
            );
            break;
        }

        match introspect_path(backends, bus, service, &path).await {
            Introspection::Catalog(text) => {
                for child in child_nodes(&text) {
                    let joined = join_path(&path, &child);
                    if util::validate_object_path(&joined).is_ok() && !discovered.contains(&joined)
                    {
                        pending.push(joined);
                    }
                }
                discovered.insert(path);
            }
            Introspection::Unavailable => {
                if path == "/" {
                    return None;
                }
                tracing::debug!(service, path = %path, "walk branch ended: introspection failed");
            }
        }
    }

    Some(discovered)
}

/// Root plus the service name with every `.` replaced by `/`.
fn heuristic_paths(service: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    paths.insert("/".to_string());
    paths.insert(format!("/{}", service.replace('.', "/")));
    paths
}

fn join_path(parent: &str, child: &str) -> String {
    if parent == "/" {
        format!("/{child}")
    } else {
        format!("{parent}/{child}")
    }
}

/// Every path token in a rendered tree. Lines carry box-drawing prefixes
/// (`└─`, `├─`, `│`); the token is everything from the first `/` to the end of
/// the line.
fn parse_tree_paths(output: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    for line in output.lines() {
        let Some(idx) = line.find('/') else {
            continue;
        };
        let token = line[idx..].trim_end();
        if util::validate_object_path(token).is_ok() {
            paths.insert(token.to_string());
        }
    }
    paths
}

/// Child node names declared in one introspection catalog.
///
/// Handles both forms the backends produce: introspection XML
/// (`<node name="child"/>`, the root element has no name) and the textual
/// `gdbus introspect` rendering (`node child {`, the root header carries an
/// absolute path and is skipped).
fn child_nodes(catalog: &str) -> Vec<String> {
    let mut children = Vec::new();
    let mut seen = BTreeSet::new();

    for (idx, _) in catalog.match_indices("<node") {
        let tag = &catalog[idx..];
        let end = tag.find('>').unwrap_or(tag.len());
        let tag = &tag[..end];
        let Some(name_at) = tag.find("name=\"") else {
            continue;
        };
        let rest = &tag[name_at + "name=\"".len()..];
        let Some(quote) = rest.find('"') else {
            continue;
        };
        push_child(&mut children, &mut seen, &rest[..quote]);
    }

    for line in catalog.lines() {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("node ") else {
            continue;
        };
        let Some(name) = rest.strip_suffix('{').map(str::trim_end) else {
            continue;
        };
        push_child(&mut children, &mut seen, name);
    }

    children
}

fn push_child(children: &mut Vec<String>, seen: &mut BTreeSet<String>, name: &str) {
    if name.is_empty() || name.contains('/') || name.contains(char::is_whitespace) {
        return;
    }
    if seen.insert(name.to_string()) {
        children.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::backend::mock::MockBackend;

    use futures_lite::future::block_on;

    fn boxed(b: MockBackend) -> Box<dyn IntrospectionBackend> {
        Box::new(b)
    }

    fn paths(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_tree_paths_strips_box_drawing() {
        let out = "\
└─/org
  └─/org/freedesktop
    ├─/org/freedesktop/login1
    └─/org/freedesktop/login1/session
";
        assert_eq!(
            parse_tree_paths(out),
            paths(&[
                "/org",
                "/org/freedesktop",
                "/org/freedesktop/login1",
                "/org/freedesktop/login1/session"
            ])
        );
    }

    #[test]
    fn parse_tree_paths_accepts_bare_root() {
        assert_eq!(parse_tree_paths("/\n"), paths(&["/"]));
        assert!(parse_tree_paths("No objects.\n").is_empty());
    }

    #[test]
    fn child_nodes_from_xml() {
        let xml = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN" "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <interface name="org.freedesktop.DBus.Peer"/>
  <node name="session"/>
  <node name="seat"/>
  <node name="session"/>
</node>"#;
        assert_eq!(child_nodes(xml), vec!["session", "seat"]);
    }

    #[test]
    fn child_nodes_from_gdbus_text() {
        let text = "\
node /org/freedesktop/login1 {
  interface org.freedesktop.DBus.Peer {
    methods:
      Ping();
  };
  node session {
  };
  node seat {
  };
};
";
        assert_eq!(child_nodes(text), vec!["session", "seat"]);
    }

    #[test]
    fn join_path_handles_root() {
        assert_eq!(join_path("/", "org"), "/org");
        assert_eq!(join_path("/org", "freedesktop"), "/org/freedesktop");
    }

    #[test]
    fn heuristic_from_service_name() {
        assert_eq!(
            heuristic_paths("com.acme.Foo"),
            paths(&["/", "/com/acme/Foo"])
        );
    }

    #[test]
    fn tree_strategy_wins_when_available() {
        let mut tree = MockBackend::new("busctl", BackendKind::TreeCapable);
        tree.tree = Some("└─/org\n  └─/org/example\n");
        let backends = vec![boxed(tree)];

        let d = block_on(discover_paths(
            &backends,
            BusType::System,
            "org.example.A",
            &DumpOptions::default(),
        ));
        assert_eq!(d.method, DiscoveryMethod::Tree);
        assert_eq!(d.paths, paths(&["/org", "/org/example"]));
        assert!(d.tree.is_some());
    }

    #[test]
    fn tree_failure_falls_back_to_walk_not_heuristic() {
        // Tree-capable tool present but failing; the walk must win over the
        // name-derived guess.
        let tree = MockBackend::new("busctl", BackendKind::TreeCapable);
        let mut walker = MockBackend::new("gdbus", BackendKind::IntrospectRecursive);
        walker.catalogs.insert("/", "<node>\n  <node name=\"org\"/>\n</node>");
        walker
            .catalogs
            .insert("/org", "<node>\n  <node name=\"example\"/>\n</node>");
        walker.catalogs.insert("/org/example", "<node>\n</node>");
        let backends = vec![boxed(tree), boxed(walker)];

        let d = block_on(discover_paths(
            &backends,
            BusType::System,
            "org.example.A",
            &DumpOptions::default(),
        ));
        assert_eq!(d.method, DiscoveryMethod::Walk);
        assert_eq!(d.paths, paths(&["/", "/org", "/org/example"]));
    }

    #[test]
    fn walk_branch_terminates_silently_on_failure() {
        let mut walker = MockBackend::new("gdbus", BackendKind::IntrospectRecursive);
        walker.catalogs.insert(
            "/",
            "<node>\n  <node name=\"good\"/>\n  <node name=\"bad\"/>\n</node>",
        );
        walker.catalogs.insert("/good", "<node/>");
        // "/bad" is unscripted: introspection fails, nothing below it is assumed.
        let backends = vec![boxed(walker)];

        let d = block_on(discover_paths(
            &backends,
            BusType::System,
            "org.example.A",
            &DumpOptions::default(),
        ));
        assert_eq!(d.method, DiscoveryMethod::Walk);
        assert_eq!(d.paths, paths(&["/", "/good"]));
    }

    #[test]
    fn all_strategies_exhausted_yields_heuristic() {
        let backends = vec![boxed(MockBackend::new(
            "dbus-send",
            BackendKind::SimpleCall,
        ))];

        let d = block_on(discover_paths(
            &backends,
            BusType::System,
            "com.acme.Foo",
            &DumpOptions::default(),
        ));
        assert_eq!(d.method, DiscoveryMethod::Heuristic);
        assert_eq!(d.paths, paths(&["/", "/com/acme/Foo"]));
    }

    #[test]
    fn walk_respects_node_limit() {
        // Every node declares one child, so the walk would never end without
        // the guard. The mock only scripts a few levels; the limit cuts in
        // first.
        let mut walker = MockBackend::new("gdbus", BackendKind::IntrospectRecursive);
        walker.catalogs.insert("/", "<node><node name=\"a\"/></node>");
        walker.catalogs.insert("/a", "<node><node name=\"a\"/></node>");
        walker.catalogs.insert("/a/a", "<node><node name=\"a\"/></node>");
        let backends = vec![boxed(walker)];

        let opts = DumpOptions {
            max_walk_nodes: 2,
            ..Default::default()
        };
        let d = block_on(discover_paths(&backends, BusType::System, "org.example.A", &opts));
        assert_eq!(d.method, DiscoveryMethod::Walk);
        assert_eq!(d.paths.len(), 2);
    }
}
