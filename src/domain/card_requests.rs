use crate::domain::{CardId, CardStatus};
use chrono::{DateTime, SecondsFormat, Utc};

/// Body of `PATCH /api/v1/card` that only touches the birthday field.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBirthdayRequest<'a> {
    pub card_id: &'a CardId,
    pub card_payload: BirthdayPayload,
}

#[derive(Debug, serde::Serialize)]
pub struct BirthdayPayload {
    pub birthday: String,
}

impl<'a> UpdateBirthdayRequest<'a> {
    pub fn new(card_id: &'a CardId, birthday: DateTime<Utc>) -> Self {
        Self {
            card_id,
            card_payload: BirthdayPayload {
                birthday: birthday.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }
}

/// Body of `POST /api/v1/card/status`.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStatusChangeRequest<'a> {
    pub card_id: &'a CardId,
    pub status: CardStatus,
}
