use serde::{Deserialize, Serialize};

/// A contact as the provider's accounting API represents it.
///
/// The wire format is PascalCase JSON; only the fields this application reads
/// or writes are modeled, everything else is ignored on deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(rename = "ContactID", skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_status: Option<String>,
}

impl Contact {
    /// A new contact carrying only a name, as the create-contact form posts it.
    pub fn named(name: &str) -> Self {
        Self {
            contact_id: None,
            name: name.trim().to_string(),
            email_address: None,
            contact_status: None,
        }
    }
}

/// Response envelope: the API wraps collections in a field named after the
/// resource, both for reads and for create echoes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsEnvelope {
    #[serde(rename = "Contacts", default)]
    pub contacts: Vec<Contact>,
}
