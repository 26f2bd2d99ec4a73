mod card_id;
mod card_requests;
mod card_status;
mod email_address;
mod email_card_entry;
mod tenant_id;

pub use card_id::CardId;
pub use card_requests::{CardStatusChangeRequest, UpdateBirthdayRequest};
pub use card_status::CardStatus;
pub use email_address::EmailAddress;
pub use email_card_entry::EmailCardEntry;
pub use tenant_id::TenantId;
