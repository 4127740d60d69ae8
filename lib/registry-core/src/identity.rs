//! Logical service identity

use registry_api::VendorRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (app, service, version) triple naming a service independent of where it runs
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub app: String,
    pub service: String,
    pub version: String,
}

impl ServiceIdentity {
    pub fn new(app: impl Into<String>, service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            service: service.into(),
            version: version.into(),
        }
    }

    /// Cache key, `"{app}/{service}/{version}"`
    pub fn key(&self) -> String {
        full_service_name(&self.app, &self.service, &self.version)
    }

    /// Parse a full `app/service/version` key back into an identity
    pub fn parse_key(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(app), Some(service), Some(version), None)
                if !app.is_empty() && !service.is_empty() && !version.is_empty() =>
            {
                Some(Self::new(app, service, version))
            }
            _ => None,
        }
    }

    /// Wire form used in the `register` packet vendor list
    pub fn to_vendor_ref(&self) -> VendorRef {
        VendorRef {
            app: self.app.clone(),
            service: self.service.clone(),
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app, self.service, self.version)
    }
}

impl From<(&str, &str, &str)> for ServiceIdentity {
    fn from((app, service, version): (&str, &str, &str)) -> Self {
        Self::new(app, service, version)
    }
}

pub(crate) fn full_service_name(app: &str, service: &str, version: &str) -> String {
    format!("{}/{}/{}", app, service, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let id = ServiceIdentity::new("billing", "invoice", "1");
        assert_eq!(id.key(), "billing/invoice/1");
        assert_eq!(id.to_string(), id.key());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(
            ServiceIdentity::parse_key("billing/invoice/1"),
            Some(ServiceIdentity::new("billing", "invoice", "1"))
        );
        assert_eq!(ServiceIdentity::parse_key("invoice"), None);
        assert_eq!(ServiceIdentity::parse_key("billing/invoice"), None);
        assert_eq!(ServiceIdentity::parse_key("a/b/c/d"), None);
        assert_eq!(ServiceIdentity::parse_key("billing//1"), None);
    }

    #[test]
    fn test_changing_a_field_changes_the_key() {
        let v1 = ServiceIdentity::new("billing", "invoice", "1");
        let v2 = ServiceIdentity::new("billing", "invoice", "2");
        assert_ne!(v1.key(), v2.key());
    }
}
