use std::sync::OnceLock;

use mac_oui::Oui;
use switchtrace_common::model::MacAddress;
use switchtrace_common::vendors::VendorRepository;
use tracing::warn;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

fn get_oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!(error = ?e, "OUI database unavailable, vendor lookup disabled");
                None
            }
        })
        .as_ref()
}

/// Vendor lookup against the OUI database bundled with `mac_oui`.
pub struct MacOuiRepo;

impl VendorRepository for MacOuiRepo {
    fn get_vendor(&self, mac: &MacAddress) -> Option<String> {
        let db = get_oui_db()?;
        match db.lookup_by_mac(&mac.colon()) {
            Ok(Some(entry)) => Some(entry.company_name.clone()),
            _ => None,
        }
    }
}
