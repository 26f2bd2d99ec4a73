//! Template → pass → update sequence.
//!
//! The id assigned to the new pass is handed to the update step through a
//! [`CardFlowContext`] owned by the run. Fixture files stay untouched unless
//! the flow is asked to persist the id into the update fixture as well.
use crate::api_client::{ApiClient, RequestError, is_truthy};
use crate::authentication::{AccessToken, AuthError, Credentials, get_token};
use crate::domain::{CardId, TenantId};
use crate::fixtures::{CardFlowFixtures, FixtureError, save_fixture};
use crate::telemetry::error_chain_fmt;
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

pub const TEMPLATE_PATH: &str = "/api/v1/template";
pub const CARD_PATH: &str = "/api/v1/card";

/// Field paths tried, in priority order, when no explicit list is configured.
pub const DEFAULT_CARD_ID_FIELDS: [&str; 5] =
    ["cardId", "id", "data.cardId", "card.id", "result.cardId"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFlowStep {
    Authenticate,
    CreateTemplate,
    CreatePass,
    UpdatePass,
}

impl std::fmt::Display for CardFlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardFlowStep::Authenticate => "authenticate",
            CardFlowStep::CreateTemplate => "create-template",
            CardFlowStep::CreatePass => "create-pass",
            CardFlowStep::UpdatePass => "update-pass",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error)]
pub enum CardFlowError {
    #[error("The {} step failed", CardFlowStep::Authenticate)]
    Authentication(#[from] AuthError),
    #[error("The {step} step failed")]
    Request {
        step: CardFlowStep,
        #[source]
        source: RequestError,
    },
    #[error("The {step} step returned an empty response")]
    EmptyResponse { step: CardFlowStep },
    #[error("Failed to persist the created card id")]
    PersistCardId(#[source] FixtureError),
}

impl std::fmt::Debug for CardFlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl CardFlowError {
    pub fn step(&self) -> CardFlowStep {
        match self {
            CardFlowError::Authentication(_) => CardFlowStep::Authenticate,
            CardFlowError::Request { step, .. } | CardFlowError::EmptyResponse { step } => *step,
            CardFlowError::PersistCardId(_) => CardFlowStep::CreatePass,
        }
    }
}

/// State carried from one step to the next within a single run.
#[derive(Debug)]
pub struct CardFlowContext {
    token: AccessToken,
    tenant_id: TenantId,
    update_pass: Map<String, Value>,
    card_id: Option<CardId>,
}

impl CardFlowContext {
    pub fn new(token: AccessToken, tenant_id: TenantId, update_pass: Map<String, Value>) -> Self {
        Self {
            token,
            tenant_id,
            update_pass,
            card_id: None,
        }
    }

    /// Record the id of the pass created in this run and point the update at it.
    pub fn adopt_card_id(&mut self, card_id: CardId) {
        self.update_pass
            .insert("cardId".into(), Value::String(card_id.to_string()));
        self.card_id = Some(card_id);
    }

    pub fn card_id(&self) -> Option<&CardId> {
        self.card_id.as_ref()
    }

    pub fn update_pass(&self) -> &Map<String, Value> {
        &self.update_pass
    }
}

#[derive(Debug)]
pub struct CardFlowReport {
    pub template: Value,
    pub pass: Value,
    /// `None` when the create-pass response carried no recognisable id.
    pub card_id: Option<CardId>,
    pub update_request: Map<String, Value>,
    pub update_response: Value,
}

/// Look up the first non-empty id among `fields`, each a dotted path.
///
/// Strings must be valid card ids; numbers are rendered as strings.
pub fn extract_card_id<S>(response: &Value, fields: &[S]) -> Option<CardId>
where
    S: AsRef<str>,
{
    fields.iter().find_map(|field| {
        let value = field
            .as_ref()
            .split('.')
            .try_fold(response, |current, key| current.get(key))?;
        match value {
            Value::String(s) => CardId::parse(s.clone()).ok(),
            Value::Number(n) => CardId::parse(n.to_string()).ok(),
            _ => None,
        }
    })
}

pub struct CardFlow<'a> {
    api_client: &'a ApiClient,
    card_id_fields: &'a [String],
    persist_to: Option<&'a Path>,
}

impl<'a> CardFlow<'a> {
    pub fn new(api_client: &'a ApiClient, card_id_fields: &'a [String]) -> Self {
        Self {
            api_client,
            card_id_fields,
            persist_to: None,
        }
    }

    /// Also write the updated payload to `update_fixture` once a card id is
    /// extracted. The file is left alone when no id is found.
    pub fn persisting_card_id_to(mut self, update_fixture: &'a Path) -> Self {
        self.persist_to = Some(update_fixture);
        self
    }

    #[tracing::instrument(
        name = "Running the card flow",
        skip_all,
        fields(run_id = %Uuid::new_v4(), tenant_id = %tenant_id, card_id = tracing::field::Empty)
    )]
    pub async fn run(
        &self,
        credentials: &Credentials,
        tenant_id: TenantId,
        fixtures: CardFlowFixtures,
    ) -> Result<CardFlowReport, CardFlowError> {
        let token = get_token(self.api_client, credentials).await?;
        let mut context = CardFlowContext::new(token, tenant_id, fixtures.update_pass);

        let template = self
            .post_truthy(
                &context,
                CardFlowStep::CreateTemplate,
                TEMPLATE_PATH,
                &fixtures.create_template,
            )
            .await?;

        let pass = self
            .post_truthy(&context, CardFlowStep::CreatePass, CARD_PATH, &fixtures.create_pass)
            .await?;
        match extract_card_id(&pass, self.card_id_fields) {
            Some(card_id) => {
                tracing::Span::current().record("card_id", tracing::field::display(&card_id));
                tracing::info!(%card_id, "Handing the created card id to the update step");
                context.adopt_card_id(card_id);
                if let Some(path) = self.persist_to {
                    save_fixture(path, context.update_pass())
                        .map_err(CardFlowError::PersistCardId)?;
                }
            }
            None => {
                tracing::warn!(
                    fields = ?self.card_id_fields,
                    response = %pass,
                    "No card id found in the create-pass response. \
                    Updating with the card id from the fixture.",
                );
            }
        }

        let update_response = self.update_pass(&context).await?;

        Ok(CardFlowReport {
            template,
            pass,
            card_id: context.card_id,
            update_request: context.update_pass,
            update_response,
        })
    }

    async fn post_truthy(
        &self,
        context: &CardFlowContext,
        step: CardFlowStep,
        path: &str,
        body: &Value,
    ) -> Result<Value, CardFlowError> {
        let response = self
            .api_client
            .post(path, Some(&context.token), Some(&context.tenant_id), body)
            .await
            .map_err(|source| CardFlowError::Request { step, source })?;
        ensure_truthy(step, response)
    }

    async fn update_pass(&self, context: &CardFlowContext) -> Result<Value, CardFlowError> {
        let step = CardFlowStep::UpdatePass;
        let response = self
            .api_client
            .patch(
                CARD_PATH,
                Some(&context.token),
                Some(&context.tenant_id),
                context.update_pass(),
            )
            .await
            .map_err(|source| CardFlowError::Request { step, source })?;
        ensure_truthy(step, response)
    }
}

fn ensure_truthy(step: CardFlowStep, response: Value) -> Result<Value, CardFlowError> {
    if is_truthy(&response) {
        Ok(response)
    } else {
        Err(CardFlowError::EmptyResponse { step })
    }
}
