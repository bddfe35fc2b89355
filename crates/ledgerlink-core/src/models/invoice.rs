use serde::{Deserialize, Serialize};

/// Invoice direction. `ACCREC` bills a customer, `ACCPAY` records a bill from
/// a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    #[serde(rename = "ACCREC")]
    AccountsReceivable,
    #[serde(rename = "ACCPAY")]
    AccountsPayable,
}

/// Invoice lifecycle status as the provider reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "SUBMITTED")]
    Submitted,
    #[serde(rename = "AUTHORISED")]
    Authorised,
    #[serde(rename = "PAID")]
    Paid,
    #[serde(rename = "VOIDED")]
    Voided,
    #[serde(rename = "DELETED")]
    Deleted,
    /// Statuses this application does not know about yet; kept so a list view
    /// never fails to render because one invoice is exotic.
    #[serde(other)]
    Unknown,
}

/// Reference to a contact by name, as invoice creation posts it. Invoice
/// reads carry a full contact object here; the extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<f64>,
}

/// An invoice as the provider's accounting API represents it.
///
/// Dates stay strings end-to-end: the provider's JSON date encoding is not
/// ISO-8601 and this application only displays and forwards them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(rename = "Type")]
    pub invoice_type: InvoiceType,
    pub contact: ContactRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    pub status: InvoiceStatus,
    #[serde(rename = "InvoiceID", skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicesEnvelope {
    #[serde(rename = "Invoices", default)]
    pub invoices: Vec<Invoice>,
}
