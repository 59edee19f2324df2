use crate::backend::{BackendKind, IntrospectionBackend, exec};
use crate::bus::BusType;
use crate::{DumpOptions, Error, Result, util};

use async_trait::async_trait;

/// `dbus-send` backend. Last resort: raw method calls against the standard
/// `org.freedesktop.DBus` interfaces, with the reply framing stripped off.
#[derive(Clone, Debug)]
pub struct DbusSend {
    opts: DumpOptions,
}

impl DbusSend {
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
impl IntrospectionBackend for DbusSend {
    fn name(&self) -> &'static str {
        "dbus-send"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::SimpleCall
    }

    async fn list_names(&self, bus: BusType) -> Result<Vec<String>> {
        let out = exec::run(
            &self.opts,
            "dbus-send",
            "dbus-send",
            &[
                Self::bus_flag(bus),
                "--print-reply",
                "--dest=org.freedesktop.DBus",
                "/org/freedesktop/DBus",
                "org.freedesktop.DBus.ListNames",
            ],
        )
        .await?;
        Ok(util::quoted_strings(&out))
    }

    async fn get_tree(&self, _bus: BusType, _service: &str) -> Result<String> {
        Err(Error::BackendUnavailable {
            backend: "dbus-send",
            detail: "dbus-send has no tree rendering".to_string(),
        })
    }

    async fn introspect(&self, bus: BusType, service: &str, path: &str) -> Result<String> {
        let dest = format!("--dest={service}");
        let out = exec::run(
            &self.opts,
            "dbus-send",
            "dbus-send",
            &[
                Self::bus_flag(bus),
                "--print-reply",
                dest.as_str(),
                path,
                "org.freedesktop.DBus.Introspectable.Introspect",
            ],
        )
        .await?;
        Ok(extract_reply_string(&out))
    }
}

/// Strip the `method return` framing: the payload is the single `string "…"`
/// argument. The payload itself contains double quotes (XML attributes), but
/// nothing follows the reply, so the closing quote is the last one in the
/// output.
fn extract_reply_string(output: &str) -> String {
    let Some(start) = output.find("string \"") else {
        return output.to_string();
    };
    let rest = &output[start + "string \"".len()..];
    match rest.rfind('"') {
        Some(end) => rest[..end].to_string(),
        None => rest.to_string(),
    }
}
