//! Stripe event and checkout session payloads
//!
//! Only the fields reconciliation needs are modelled, and all of them are
//! optional, so newer Stripe API versions that add or rename unrelated fields
//! still deserialize.

use serde::Deserialize;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Custom field key carrying the student ID on the checkout form
pub const STUDENT_ID_FIELD: &str = "uhstudentid";
/// Custom field key carrying the shirt size on the checkout form
pub const SHIRT_SIZE_FIELD: &str = "shirtsize";

/// Name used when the checkout supplies neither a name nor an email
pub const PLACEHOLDER_NAME: &str = "Unknown";

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub id: String,
    pub customer_details: Option<CustomerDetails>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub key: String,
    pub text: Option<CustomFieldValue>,
    pub dropdown: Option<CustomFieldValue>,
    pub numeric: Option<CustomFieldValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFieldValue {
    pub value: Option<String>,
}

impl CustomField {
    /// First non-empty value among text, dropdown and numeric
    pub fn value(&self) -> Option<&str> {
        [&self.text, &self.dropdown, &self.numeric]
            .into_iter()
            .flatten()
            .filter_map(|v| v.value.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

impl CheckoutSession {
    pub fn custom_field(&self, key: &str) -> Option<String> {
        self.custom_fields
            .as_deref()?
            .iter()
            .find(|field| field.key == key)
            .and_then(CustomField::value)
            .map(str::to_string)
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Identity and contact fields extracted from a completed checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Lowercased
    pub email: Option<String>,
    /// Customer name, else the email's local part, else [`PLACEHOLDER_NAME`]
    pub name: String,
    pub phone: Option<String>,
    pub student_id: Option<String>,
    pub shirt_size: Option<String>,
}

impl CheckoutDetails {
    pub fn from_session(session: &CheckoutSession) -> Self {
        let customer = session.customer_details.clone().unwrap_or_default();
        let email = clean(customer.email.as_deref()).map(|e| e.to_lowercase());

        let name = clean(customer.name.as_deref())
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .and_then(|local| clean(Some(local)))
            })
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

        Self {
            email,
            name,
            phone: clean(customer.phone.as_deref()),
            student_id: session.custom_field(STUDENT_ID_FIELD),
            shirt_size: session.custom_field(SHIRT_SIZE_FIELD),
        }
    }

    /// Whether the name is a real name rather than the placeholder
    pub fn has_real_name(&self) -> bool {
        self.name != PLACEHOLDER_NAME
    }
}
