use crate::model::MacAddress;

/// Looks up the organization that owns a MAC address prefix.
pub trait VendorRepository: Send + Sync {
    fn get_vendor(&self, mac: &MacAddress) -> Option<String>;
}
