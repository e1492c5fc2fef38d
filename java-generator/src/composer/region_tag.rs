//! Region tags identify a sample as an independently extractable snippet.

/// `<api>_<version>_generated_<client>_<rpc>[_<suffix>]_sync`, lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionTag {
    pub api_short_name: String,
    pub api_version: String,
    /// Client class name, e.g. `EchoClient`.
    pub service_name: String,
    pub rpc_name: String,
    pub overload_disambiguation: String,
}

impl RegionTag {
    /// Derive the api name and version from a proto package:
    /// `google.showcase.v1beta1` gives `showcase` and `v1beta1`.
    pub fn new(
        proto_package: &str,
        service_name: impl Into<String>,
        rpc_name: impl Into<String>,
        overload_disambiguation: impl Into<String>,
    ) -> Self {
        let segments: Vec<&str> = proto_package.split('.').filter(|s| !s.is_empty()).collect();
        let (api_short_name, api_version) = match segments.as_slice() {
            [.., api, version] if is_version(version) => (api.to_string(), version.to_string()),
            [.., api] => (api.to_string(), String::new()),
            [] => (String::new(), String::new()),
        };
        Self {
            api_short_name,
            api_version,
            service_name: service_name.into(),
            rpc_name: rpc_name.into(),
            overload_disambiguation: overload_disambiguation.into(),
        }
    }

    pub fn generate(&self) -> String {
        let parts = [
            self.api_short_name.as_str(),
            self.api_version.as_str(),
            "generated",
            self.service_name.as_str(),
            self.rpc_name.as_str(),
            self.overload_disambiguation.as_str(),
            "sync",
        ];
        parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }
}

/// `v1`, `v2beta3`, `v1p1beta1`.
fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}
