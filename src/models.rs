use serde::{Deserialize, Serialize};

// ── Inbound request body ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRequest {
    pub form_details: FormDetails,
    pub chat_session: Option<ChatSession>,
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDetails {
    pub first_name: String,
    pub email: String,
    pub additional_details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub chat_session_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    #[serde(rename = "currentUrl")]
    pub current_url: String,
}

/// One turn of the chat transcript. Order is chronological and meaningful.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

// ── Outbound Salesforce payload ───────────────────────────────────────────────

/// Flat field map for the Salesforce `Case` sobject. Built fresh per request;
/// field names are the CRM's, hence the explicit renames.
#[derive(Debug, Clone, Serialize)]
pub struct CasePayload {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "SuppliedEmail")]
    pub supplied_email: String,
    #[serde(rename = "SuppliedName")]
    pub supplied_name: String,
    #[serde(rename = "Type")]
    pub case_type: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}
