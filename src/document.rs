//! The dump document: the single output artifact of a run.
//!
//! All escaping and quoting is owned by the YAML serializer; no call site ever
//! interpolates raw tool output into structural syntax. `BTreeMap` keys give
//! lexicographic ordering, so two runs over the same backend responses
//! serialize identically.

use crate::bus::BusType;
use crate::discover::{Discovery, DiscoveryMethod};
use crate::introspect::Introspection;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::path::Path;

/// Marker stored when path discovery produced nothing for a service. The
/// service still gets a document entry; silence must never look like absence
/// of processing.
pub const NO_PATHS_MARKER: &str = "<no paths found>";

/// Marker stored in `tree` when no tree rendering is available.
pub const NO_TREE_MARKER: &str = "<no tree available>";

/// Marker stored in `tree` when the path set was guessed from the service
/// name rather than discovered.
pub const HEURISTIC_TREE_MARKER: &str = "<paths guessed from service name, not discovered>";

/// Marker stored when every backend failed to introspect a path.
pub const INTROSPECTION_UNAVAILABLE_MARKER: &str = "<introspection unavailable>";

/// Root aggregate: service name -> tree text + per-path catalogs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DumpDocument {
    pub dump: BTreeMap<String, ServiceEntry>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceEntry {
    /// Rendered tree, or one of the tree/no-paths markers.
    pub tree: String,
    /// Object path -> catalog, sorted by path.
    pub objects: BTreeMap<String, ObjectEntry>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ObjectEntry {
    /// Raw catalog text, or `INTROSPECTION_UNAVAILABLE_MARKER`.
    pub introspection: String,
}

impl DumpDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fully processed service. Keys are never revisited; the
    /// per-service results arrive exactly once from the orchestrator.
    pub fn add_service(
        &mut self,
        service: &str,
        discovery: &Discovery,
        introspections: BTreeMap<String, Introspection>,
    ) {
        let tree = if discovery.paths.is_empty() {
            NO_PATHS_MARKER.to_string()
        } else {
            match (discovery.method, &discovery.tree) {
                (DiscoveryMethod::Tree, Some(text)) if !text.trim().is_empty() => text.clone(),
                (DiscoveryMethod::Heuristic, _) => HEURISTIC_TREE_MARKER.to_string(),
                _ => NO_TREE_MARKER.to_string(),
            }
        };

        let objects = introspections
            .into_iter()
            .map(|(path, result)| {
                let introspection = match result {
                    Introspection::Catalog(text) => text,
                    Introspection::Unavailable => INTROSPECTION_UNAVAILABLE_MARKER.to_string(),
                };
                (path, ObjectEntry { introspection })
            })
            .collect();

        self.dump
            .insert(service.to_string(), ServiceEntry { tree, objects });
    }

    /// Serialize to YAML with an informational header comment block. The
    /// header records when and against which bus the snapshot was taken; it is
    /// not needed for round-tripping the body.
    pub fn to_yaml(&self, bus: BusType) -> Result<String> {
        let body = serde_yaml::to_string(self).map_err(|e| Error::IoError {
            context: format!("serialize dump: {e}"),
        })?;
        let generated = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        Ok(format!(
            "# dbusdump snapshot\n# generated: {generated}\n# bus: {bus}\n{body}"
        ))
    }

    /// Write the finalized document. Diagnostics never share this stream.
    pub fn write_to(&self, path: &Path, bus: BusType) -> Result<()> {
        let text = self.to_yaml(bus)?;
        std::fs::write(path, text).map_err(|e| Error::IoError {
            context: format!("write {}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;

    use std::collections::BTreeSet;

    fn discovery(method: DiscoveryMethod, paths: &[&str], tree: Option<&str>) -> Discovery {
        Discovery {
            paths: paths.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            tree: tree.map(str::to_string),
            method,
        }
    }

    #[test]
    fn service_with_no_paths_still_appears_with_marker() {
        let mut doc = DumpDocument::new();
        doc.add_service(
            "org.example.Empty",
            &discovery(DiscoveryMethod::Tree, &[], Some("")),
            BTreeMap::new(),
        );

        let entry = doc.dump.get("org.example.Empty").expect("entry present");
        assert_eq!(entry.tree, NO_PATHS_MARKER);
        assert!(entry.objects.is_empty());

        let yaml = doc.to_yaml(BusType::System).expect("serialize");
        assert!(yaml.contains("org.example.Empty"));
        assert!(yaml.contains(NO_PATHS_MARKER));
    }

    #[test]
    fn unavailable_introspection_becomes_marker() {
        let mut doc = DumpDocument::new();
        let mut objects = BTreeMap::new();
        objects.insert("/x".to_string(), Introspection::Unavailable);
        doc.add_service(
            "org.example.A",
            &discovery(DiscoveryMethod::Walk, &["/x"], None),
            objects,
        );

        let entry = doc.dump.get("org.example.A").expect("entry present");
        assert_eq!(entry.tree, NO_TREE_MARKER);
        assert_eq!(
            entry.objects.get("/x").expect("path present").introspection,
            INTROSPECTION_UNAVAILABLE_MARKER
        );
    }

    #[test]
    fn heuristic_discovery_is_marked() {
        let mut doc = DumpDocument::new();
        let mut objects = BTreeMap::new();
        objects.insert(
            "/com/acme/Foo".to_string(),
            Introspection::Catalog("iface".to_string()),
        );
        doc.add_service(
            "com.acme.Foo",
            &discovery(DiscoveryMethod::Heuristic, &["/", "/com/acme/Foo"], None),
            objects,
        );

        let entry = doc.dump.get("com.acme.Foo").expect("entry present");
        assert_eq!(entry.tree, HEURISTIC_TREE_MARKER);
    }

    #[test]
    fn adversarial_text_round_trips() {
        let nasty = "- leading dash\n\"quoted\"\n: colon line\n42 leading digit\n\ttab\nfinal";
        let mut doc = DumpDocument::new();
        let mut objects = BTreeMap::new();
        objects.insert(
            "/x".to_string(),
            Introspection::Catalog(nasty.to_string()),
        );
        doc.add_service(
            "org.example:weird.name",
            &discovery(DiscoveryMethod::Walk, &["/x"], None),
            objects,
        );

        let yaml = serde_yaml::to_string(&doc).expect("serialize");
        let parsed: DumpDocument = serde_yaml::from_str(&yaml).expect("parse back");
        assert_eq!(parsed, doc);
        assert_eq!(
            parsed
                .dump
                .get("org.example:weird.name")
                .expect("service")
                .objects
                .get("/x")
                .expect("path")
                .introspection,
            nasty
        );
    }

    #[test]
    fn serialization_is_deterministic_and_sorted() {
        let mut doc = DumpDocument::new();
        for service in ["org.zzz.Last", "org.aaa.First"] {
            let mut objects = BTreeMap::new();
            objects.insert(
                "/b".to_string(),
                Introspection::Catalog("b".to_string()),
            );
            objects.insert(
                "/a".to_string(),
                Introspection::Catalog("a".to_string()),
            );
            doc.add_service(
                service,
                &discovery(DiscoveryMethod::Walk, &["/a", "/b"], None),
                objects,
            );
        }

        let first = serde_yaml::to_string(&doc).expect("serialize");
        let second = serde_yaml::to_string(&doc).expect("serialize");
        assert_eq!(first, second);

        let aaa = first.find("org.aaa.First").expect("first service");
        let zzz = first.find("org.zzz.Last").expect("last service");
        assert!(aaa < zzz);
        let a = first.find("/a").expect("path a");
        let b = first.find("/b").expect("path b");
        assert!(a < b);
    }

    #[test]
    fn header_records_bus_type() {
        let doc = DumpDocument::new();
        let yaml = doc.to_yaml(BusType::Session).expect("serialize");
        assert!(yaml.starts_with("# dbusdump snapshot\n# generated: "));
        assert!(yaml.contains("# bus: session\n"));
    }
}
