use crate::api_client::{ApiClient, RequestError};
use crate::authentication::AccessToken;
use crate::card_flow::CARD_PATH;
use crate::domain::{
    CardId, CardStatus, CardStatusChangeRequest, EmailCardEntry, TenantId, UpdateBirthdayRequest,
};
use crate::telemetry::error_chain_fmt;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const CARD_STATUS_PATH: &str = "/api/v1/card/status";

// Status transitions applied, in order, to the retired subset
const RETIREMENT: [CardStatus; 2] = [CardStatus::Inactive, CardStatus::Deleted];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    UpdateBirthday,
    ChangeStatus,
}

impl std::fmt::Display for BulkPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BulkPhase::UpdateBirthday => f.write_str("birthday update"),
            BulkPhase::ChangeStatus => f.write_str("status change"),
        }
    }
}

#[derive(thiserror::Error)]
#[error("The {phase} of card {card_id} failed")]
pub struct BulkUpdateError {
    pub phase: BulkPhase,
    pub card_id: CardId,
    #[source]
    pub source: RequestError,
}

impl std::fmt::Debug for BulkUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct BulkUpdateOptions {
    pub birthday: DateTime<Utc>,
    /// How many leading entries are moved to INACTIVE and then DELETED.
    pub status_change_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    pub card_id: CardId,
    pub phase: BulkPhase,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BulkUpdateReport {
    pub updated: Vec<CardId>,
    pub retired: Vec<CardId>,
    pub skipped: Vec<SkippedCard>,
}

pub struct BulkUpdate<'a> {
    api_client: &'a ApiClient,
    token: &'a AccessToken,
    tenant_id: Option<&'a TenantId>,
    options: BulkUpdateOptions,
}

impl<'a> BulkUpdate<'a> {
    pub fn new(
        api_client: &'a ApiClient,
        token: &'a AccessToken,
        tenant_id: Option<&'a TenantId>,
        options: BulkUpdateOptions,
    ) -> Self {
        Self {
            api_client,
            token,
            tenant_id,
            options,
        }
    }

    /// Update every entry's birthday, then retire the leading entries.
    ///
    /// A "not found" failure skips the entry for the current phase. Any other
    /// failure aborts the run.
    #[tracing::instrument(
        name = "Running the bulk card update",
        skip_all,
        fields(run_id = %Uuid::new_v4(), entries = entries.len())
    )]
    pub async fn run(&self, entries: &[EmailCardEntry]) -> Result<BulkUpdateReport, BulkUpdateError> {
        let mut report = BulkUpdateReport::default();

        for entry in entries {
            tracing::info!(email = %entry.email, card_id = %entry.card_id, "Updating birthday");
            let phase = BulkPhase::UpdateBirthday;
            match self.update_birthday(&entry.card_id).await {
                Ok(()) => report.updated.push(entry.card_id.clone()),
                Err(e) => skip_or_abort(&mut report, phase, &entry.card_id, e)?,
            }
        }

        for entry in entries.iter().take(self.options.status_change_limit) {
            tracing::info!(email = %entry.email, card_id = %entry.card_id, "Retiring card");
            let phase = BulkPhase::ChangeStatus;
            match self.retire(&entry.card_id).await {
                Ok(()) => report.retired.push(entry.card_id.clone()),
                Err(e) => skip_or_abort(&mut report, phase, &entry.card_id, e)?,
            }
        }

        Ok(report)
    }

    async fn update_birthday(&self, card_id: &CardId) -> Result<(), RequestError> {
        let body = UpdateBirthdayRequest::new(card_id, self.options.birthday);
        let updated = self
            .api_client
            .patch(CARD_PATH, Some(self.token), self.tenant_id, &body)
            .await?;
        tracing::info!(result = %updated, "Birthday updated");
        self.fetch_card(card_id).await
    }

    async fn retire(&self, card_id: &CardId) -> Result<(), RequestError> {
        for status in RETIREMENT {
            let body = CardStatusChangeRequest { card_id, status };
            self.api_client
                .post(CARD_STATUS_PATH, Some(self.token), self.tenant_id, &body)
                .await?;
            tracing::info!(%card_id, %status, "Card status changed");
        }
        self.fetch_card(card_id).await
    }

    async fn fetch_card(&self, card_id: &CardId) -> Result<(), RequestError> {
        let card = self
            .api_client
            .get(&format!("{}/{}", CARD_PATH, card_id), Some(self.token), self.tenant_id)
            .await?;
        tracing::info!(card = %card, "Fetched card");
        Ok(())
    }
}

fn skip_or_abort(
    report: &mut BulkUpdateReport,
    phase: BulkPhase,
    card_id: &CardId,
    e: RequestError,
) -> Result<(), BulkUpdateError> {
    if e.is_not_found() {
        tracing::warn!(%card_id, %phase, error.message = %e, "Skipping card");
        report.skipped.push(SkippedCard {
            card_id: card_id.clone(),
            phase,
            reason: e.to_string(),
        });
        Ok(())
    } else {
        Err(BulkUpdateError {
            phase,
            card_id: card_id.clone(),
            source: e,
        })
    }
}
