//! Generator configuration bundle.
//!
//! Every section has defaults matching the common API conventions, so an
//! empty TOML document is a valid configuration.

use std::fs;
use std::path::Path;

use parser::descriptor::{BuildOptions, LroResolution};
use serde::Deserialize;

use crate::error::GenerateError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Fully-qualified proto name of the void message.
    pub empty_type: String,
    pub pagination: PaginationConfig,
    pub lro: LroConfig,
    pub naming: NamingConfig,
    pub format: FormatConfig,
    pub settings: SettingsConfig,
    pub header: HeaderConfig,
    /// Compose services on scoped worker threads.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            empty_type: "google.protobuf.Empty".to_string(),
            pagination: PaginationConfig::default(),
            lro: LroConfig::default(),
            naming: NamingConfig::default(),
            format: FormatConfig::default(),
            settings: SettingsConfig::default(),
            header: HeaderConfig::default(),
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GenerateError> {
        toml::from_str(text).map_err(|e| GenerateError::Config(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, GenerateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GenerateError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loading generator config");
        Self::from_toml_str(&text)
    }

    /// Options for normalizing parsed files into the descriptor model.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            lro_resolution: match self.lro.resolution {
                LroResolutionRule::PackageRelative => LroResolution::PackageRelative,
                LroResolutionRule::FullyQualified => LroResolution::FullyQualified,
            },
        }
    }

    pub fn is_empty_type(&self, full_name: &str) -> bool {
        self.empty_type == full_name
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Any one of these on the request marks a page-size field.
    pub page_size_fields: Vec<String>,
    pub page_token_field: String,
    pub next_page_token_field: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size_fields: vec!["page_size".to_string(), "max_results".to_string()],
            page_token_field: "page_token".to_string(),
            next_page_token_field: "next_page_token".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LroResolutionRule {
    #[default]
    PackageRelative,
    FullyQualified,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LroConfig {
    pub operation_type: String,
    pub resolution: LroResolutionRule,
}

impl Default for LroConfig {
    fn default() -> Self {
        Self {
            operation_type: "google.longrunning.Operation".to_string(),
            resolution: LroResolutionRule::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub client_suffix: String,
    pub settings_suffix: String,
    pub stub_suffix: String,
    pub stub_package_segment: String,
    pub samples_package_segment: String,
    pub generated_annotation: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            client_suffix: "Client".to_string(),
            settings_suffix: "Settings".to_string(),
            stub_suffix: "Stub".to_string(),
            stub_package_segment: "stub".to_string(),
            samples_package_segment: "samples".to_string(),
            generated_annotation: "by gapic-generator-java".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    pub indent_width: usize,
    pub column_limit: usize,
    pub continuation_indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            column_limit: 100,
            continuation_indent: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    pub default_total_timeout_millis: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            default_total_timeout_millis: 60_000,
        }
    }
}

/// License block printed at the top of every generated file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    pub enabled: bool,
    pub copyright_year: u16,
    pub copyright_holder: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            copyright_year: 2022,
            copyright_holder: "Google LLC".to_string(),
        }
    }
}

impl HeaderConfig {
    pub fn lines(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let mut lines = vec![
            format!("Copyright {} {}", self.copyright_year, self.copyright_holder),
            String::new(),
        ];
        lines.extend(APACHE_LICENSE.iter().map(|l| l.to_string()));
        lines
    }
}

const APACHE_LICENSE: &[&str] = &[
    "Licensed under the Apache License, Version 2.0 (the \"License\");",
    "you may not use this file except in compliance with the License.",
    "You may obtain a copy of the License at",
    "",
    "     https://www.apache.org/licenses/LICENSE-2.0",
    "",
    "Unless required by applicable law or agreed to in writing, software",
    "distributed under the License is distributed on an \"AS IS\" BASIS,",
    "WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.",
    "See the License for the specific language governing permissions and",
    "limitations under the License.",
];
