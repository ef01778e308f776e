// Environment - Host environment variables and system information

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Read access to the host environment
pub trait EnvironmentSource: Send + Sync {
    /// Value of a variable; unset and empty are both `None`
    fn var(&self, name: &str) -> Option<String>;

    /// Name the operating system reports for this host
    fn os_hostname(&self) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    fn os_hostname(&self) -> Option<String> {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty())
    }
}

/// Fixed set of variables, used where the process environment must not leak in
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
    hostname: Option<String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(hostname.to_string());
        self
    }
}

impl EnvironmentSource for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|v| !v.trim().is_empty()).cloned()
    }

    fn os_hostname(&self) -> Option<String> {
        self.hostname.clone()
    }
}

/// Variable names consulted by the service (`[environment]` in the config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    pub hostname_var: String,
    pub load_certificates_var: String,
    pub sku_var: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            hostname_var: "WEBSITE_HOSTNAME".to_string(),
            load_certificates_var: "WEBSITE_LOAD_CERTIFICATES".to_string(),
            sku_var: "WEBSITE_SKU".to_string(),
        }
    }
}

/// Hosting details shown alongside the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub certificate_environment_variable: String,
    pub app_service_plan: String,
}

impl SystemInfo {
    pub fn gather(env: &dyn EnvironmentSource, settings: &EnvironmentSettings) -> Self {
        Self {
            hostname: env
                .var(&settings.hostname_var)
                .or_else(|| env.os_hostname())
                .unwrap_or_else(|| "Unknown".to_string()),
            certificate_environment_variable: env
                .var(&settings.load_certificates_var)
                .unwrap_or_else(|| "Not set".to_string()),
            app_service_plan: env
                .var(&settings.sku_var)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_from_variables() {
        let env = MapEnvironment::new()
            .with_var("WEBSITE_HOSTNAME", "inventory.azurewebsites.net")
            .with_var("WEBSITE_LOAD_CERTIFICATES", "*")
            .with_var("WEBSITE_SKU", "PremiumV3")
            .with_hostname("worker-1");

        let info = SystemInfo::gather(&env, &EnvironmentSettings::default());
        assert_eq!(info.hostname, "inventory.azurewebsites.net");
        assert_eq!(info.certificate_environment_variable, "*");
        assert_eq!(info.app_service_plan, "PremiumV3");
    }

    #[test]
    fn test_gather_fallbacks() {
        let env = MapEnvironment::new().with_hostname("worker-1");
        let info = SystemInfo::gather(&env, &EnvironmentSettings::default());
        assert_eq!(info.hostname, "worker-1");
        assert_eq!(info.certificate_environment_variable, "Not set");
        assert_eq!(info.app_service_plan, "Unknown");

        let bare = SystemInfo::gather(&MapEnvironment::new(), &EnvironmentSettings::default());
        assert_eq!(bare.hostname, "Unknown");
    }

    #[test]
    fn test_empty_variable_counts_as_unset() {
        let env = MapEnvironment::new().with_var("WEBSITE_LOAD_CERTIFICATES", "  ");
        assert_eq!(env.var("WEBSITE_LOAD_CERTIFICATES"), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let info = SystemInfo::gather(&MapEnvironment::new(), &EnvironmentSettings::default());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["certificateEnvironmentVariable"], "Not set");
        assert_eq!(json["appServicePlan"], "Unknown");
    }
}
