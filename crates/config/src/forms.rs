//! Appointment form templates
//!
//! Booking templates are looked up per tenant with a default for everyone
//! else; cancel and reschedule each have a single template.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use concierge_core::FormIntent;

use crate::ConfigError;

/// One tenant's booking template
///
/// The tenant id is carried as a value rather than a map key: the `config`
/// crate lowercases keys, and tenant ids such as `QApixW` are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantForm {
    pub tenant: String,
    pub url: String,
}

/// Booking templates per tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookFormsConfig {
    /// Template for tenants without an override
    #[serde(default = "default_book_url")]
    pub default_url: String,

    /// Per-tenant overrides
    #[serde(default)]
    pub tenants: Vec<TenantForm>,
}

impl Default for BookFormsConfig {
    fn default() -> Self {
        Self {
            default_url: default_book_url(),
            tenants: Vec::new(),
        }
    }
}

impl BookFormsConfig {
    /// Override for an exact tenant id
    pub fn tenant_url(&self, tenant_id: &str) -> Option<&str> {
        self.tenants
            .iter()
            .find(|form| form.tenant == tenant_id)
            .map(|form| form.url.as_str())
    }
}

fn default_book_url() -> String {
    "https://forms.example.com/appointments/book".to_string()
}
fn default_cancel_url() -> String {
    "https://forms.example.com/appointments/cancel".to_string()
}
fn default_reschedule_url() -> String {
    "https://forms.example.com/appointments/reschedule".to_string()
}

/// Form template table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormsConfig {
    #[serde(default)]
    pub book: BookFormsConfig,

    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,

    #[serde(default = "default_reschedule_url")]
    pub reschedule_url: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            book: BookFormsConfig::default(),
            cancel_url: default_cancel_url(),
            reschedule_url: default_reschedule_url(),
        }
    }
}

impl FormsConfig {
    /// Add or replace a tenant's booking template
    pub fn with_book_override(
        mut self,
        tenant_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let tenant = tenant_id.into();
        let url = url.into();
        match self.book.tenants.iter_mut().find(|form| form.tenant == tenant) {
            Some(form) => form.url = url,
            None => self.book.tenants.push(TenantForm { tenant, url }),
        }
        self
    }

    /// Template for an intent and (optional) tenant
    pub fn template(&self, intent: FormIntent, tenant_id: Option<&str>) -> &str {
        match intent {
            FormIntent::Book => tenant_id
                .and_then(|tenant| self.book.tenant_url(tenant))
                .unwrap_or(&self.book.default_url),
            FormIntent::Cancel => &self.cancel_url,
            FormIntent::Reschedule => &self.reschedule_url,
        }
    }

    /// Select the target for an intent and (optional) tenant
    pub fn target(&self, intent: FormIntent, tenant_id: Option<&str>) -> FormTarget {
        FormTarget::new(self.template(intent, tenant_id))
    }

    /// Every template with a label naming where it is configured
    fn labelled_templates(&self) -> Vec<(String, &str)> {
        let mut templates = vec![
            ("forms.book.default_url".to_string(), self.book.default_url.as_str()),
            ("forms.cancel_url".to_string(), self.cancel_url.as_str()),
            ("forms.reschedule_url".to_string(), self.reschedule_url.as_str()),
        ];
        for form in &self.book.tenants {
            templates.push((
                format!("forms.book.tenants.{}", form.tenant),
                form.url.as_str(),
            ));
        }
        templates
    }

    /// Reject empty templates, templates without an http(s) scheme and
    /// tenants listed twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for form in &self.book.tenants {
            if form.tenant.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "forms.book.tenants".to_string(),
                    message: "Tenant id must not be empty".to_string(),
                });
            }
            if !seen.insert(form.tenant.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("forms.book.tenants.{}", form.tenant),
                    message: "Tenant listed more than once".to_string(),
                });
            }
        }
        for (field, url) in self.labelled_templates() {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "Form template must not be empty".to_string(),
                });
            }
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("Form template must be an http(s) URL, got {}", url),
                });
            }
        }
        Ok(())
    }
}

/// A form URL template plus the separator its query parameters need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTarget {
    pub base_url: String,
    /// `'&'` iff `base_url` already carries a query string
    pub query_separator: char,
}

impl FormTarget {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let query_separator = if base_url.contains('?') { '&' } else { '?' };
        Self {
            base_url,
            query_separator,
        }
    }
}
