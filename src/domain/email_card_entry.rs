use crate::domain::{CardId, EmailAddress};

/// One row of the email → card id map driving the bulk update.
///
/// Only `card_id` drives API calls, so `email` is kept as written.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCardEntry {
    pub email: String,
    pub card_id: CardId,
}

impl EmailCardEntry {
    pub fn email_address(&self) -> Result<EmailAddress, String> {
        EmailAddress::parse(self.email.clone())
    }
}
