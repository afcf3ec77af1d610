use tracing::warn;

use crate::errors::AppError;
use crate::format::{format_chat_history, format_item};
use crate::models::{CasePayload, CaseRequest};
use crate::salesforce::SalesforceClient;
use crate::service::token_cache::TokenCache;

/// Orchestrates a support-case submission: payload construction, token fetch,
/// the authenticated CRM write, and the single 401-triggered refresh+retry.
#[derive(Clone)]
pub struct CaseService {
    token_cache: TokenCache,
    salesforce: SalesforceClient,
    chat_preview_root: Option<String>,
}

impl CaseService {
    pub fn new(
        token_cache: TokenCache,
        salesforce: SalesforceClient,
        chat_preview_root: Option<String>,
    ) -> Self {
        Self { token_cache, salesforce, chat_preview_root }
    }

    pub async fn create_support_case(&self, request: &CaseRequest) -> Result<(), AppError> {
        let payload = self.build_case_payload(request)?;

        let token = self.token_cache.get_access_token().await?;
        let mut outcome = self.salesforce.create_case(&payload, &token).await?;

        // A 401 means the cached token expired upstream. Refresh once and
        // retry once, with the refreshed token; nothing else is retried.
        if outcome.is_unauthorized() {
            warn!("Case submission rejected with 401; refreshing token and retrying once");
            let refreshed = self.token_cache.refresh().await?;
            outcome = self.salesforce.create_case(&payload, &refreshed).await?;
        }

        if outcome.is_created() {
            Ok(())
        } else {
            Err(AppError::UpstreamSubmission { status: outcome.status, body: outcome.body })
        }
    }

    /// Maps the validated request onto the flat Salesforce Case fields.
    /// Subject comes from the opening chat message when a chat session is
    /// attached, otherwise from the free-text details; a session with no
    /// usable opening message does not fall back.
    fn build_case_payload(&self, request: &CaseRequest) -> Result<CasePayload, AppError> {
        let form = &request.form_details;
        let messages = request
            .chat_session
            .as_ref()
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[]);

        let subject = match messages.first() {
            Some(first) => Some(first.content.clone()),
            None => form.additional_details.clone(),
        };
        let subject = subject.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
            AppError::invalid_request(
                "Please provide at least one user message or additional details",
            )
        })?;

        let chat_url = match (&request.chat_session, &self.chat_preview_root) {
            (Some(session), Some(root)) if !session.chat_session_id.is_empty() => {
                Some(format!("{root}?chatId={}", session.chat_session_id))
            }
            _ => None,
        };

        let comments = format!(
            "{}{}\nNote: {}{}",
            format_item("Additional details", form.additional_details.as_deref()),
            format_chat_history(messages),
            format_item("Inkeep Chat URL", chat_url.as_deref()),
            format_item("Client (Interaction Point)", Some(request.client.current_url.as_str())),
        );

        Ok(CasePayload {
            subject,
            description: "Description this case".to_string(),
            status: "New".to_string(),
            priority: "Medium".to_string(),
            supplied_email: form.email.clone(),
            supplied_name: form.first_name.clone(),
            case_type: "Question".to_string(),
            comments,
        })
    }
}
