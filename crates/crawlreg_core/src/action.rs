//! Action-string request boundary.
//!
//! # Responsibility
//! - Turn form fields into a closed set of typed requests.
//! - Run a request against `RegistryService` and build the response envelope.
//!
//! # Invariants
//! - Required fields are checked here, before any store access.
//! - Every outcome maps to exactly one status code and JSON body.

use crate::model::OrgId;
use crate::registry::RegistryError;
use crate::service::registry_service::RegistryService;
use crate::store::DocumentStore;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const FIELD_ACTION: &str = "action";
pub const FIELD_NAME: &str = "name";
pub const FIELD_ORG_ID: &str = "orgId";
pub const FIELD_CONFIG: &str = "config";
pub const FIELD_ORG_NAME: &str = "orgName";

/// Typed request accepted by the registry endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    ListOrganizations,
    CreateOrganization {
        name: String,
    },
    GetOrganizationConfig {
        org_id: OrgId,
    },
    UpsertOrganizationConfig {
        org_id: OrgId,
        /// Encoded (JSON text) partial configuration.
        config: String,
        /// Name used if the organization has to be auto-created.
        name: Option<String>,
    },
}

/// Request boundary failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    MissingField(&'static str),
    UnknownAction(String),
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::UnknownAction(action) => write!(f, "unknown action: `{action}`"),
        }
    }
}

impl Error for ActionError {}

impl ActionRequest {
    /// Parses an `application/x-www-form-urlencoded` body.
    ///
    /// Repeated fields keep their last value.
    pub fn from_form(body: &str) -> Result<Self, ActionError> {
        let fields = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect::<BTreeMap<String, String>>();
        Self::from_fields(&fields)
    }

    /// Builds a request from decoded fields.
    ///
    /// Blank values count as missing.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self, ActionError> {
        let action = required(fields, FIELD_ACTION)?;
        match normalize_action(action).as_str() {
            "listorganizations" | "listorgs" => Ok(Self::ListOrganizations),
            "createorganization" | "createorg" => Ok(Self::CreateOrganization {
                name: required(fields, FIELD_NAME)?.to_string(),
            }),
            "getorgconfig" | "getorganizationconfig" => Ok(Self::GetOrganizationConfig {
                org_id: OrgId::parse(required(fields, FIELD_ORG_ID)?),
            }),
            "updateorgconfig" | "updateorganizationconfig" | "upsertorgconfig" => {
                Ok(Self::UpsertOrganizationConfig {
                    org_id: OrgId::parse(required(fields, FIELD_ORG_ID)?),
                    config: required(fields, FIELD_CONFIG)?.to_string(),
                    name: optional(fields, FIELD_ORG_NAME)
                        .or_else(|| optional(fields, FIELD_NAME))
                        .map(str::to_string),
                })
            }
            _ => Err(ActionError::UnknownAction(action.trim().to_string())),
        }
    }

    /// Stable action label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ListOrganizations => "listOrganizations",
            Self::CreateOrganization { .. } => "createOrganization",
            Self::GetOrganizationConfig { .. } => "getOrgConfig",
            Self::UpsertOrganizationConfig { .. } => "updateOrgConfig",
        }
    }
}

/// Transport-neutral response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub status: u16,
    pub body: Value,
}

impl ActionResponse {
    fn ok(payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status: 200, body },
            Err(err) => Self::error(500, "encode_error", err.to_string()),
        }
    }

    fn error(status: u16, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into(), "code": code }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

impl From<ActionError> for ActionResponse {
    fn from(value: ActionError) -> Self {
        let code = match value {
            ActionError::MissingField(_) => "missing_field",
            ActionError::UnknownAction(_) => "unknown_action",
        };
        Self::error(400, code, value.to_string())
    }
}

impl From<RegistryError> for ActionResponse {
    fn from(value: RegistryError) -> Self {
        Self::error(value.status_code(), value.code(), value.to_string())
    }
}

/// Runs one request against the service.
pub fn dispatch<S: DocumentStore>(
    service: &RegistryService<S>,
    request: ActionRequest,
) -> ActionResponse {
    let outcome = match request {
        ActionRequest::ListOrganizations => service.list_organizations().map(ActionResponse::ok),
        ActionRequest::CreateOrganization { name } => {
            service.create_organization(&name).map(ActionResponse::ok)
        }
        ActionRequest::GetOrganizationConfig { org_id } => service
            .get_organization_config(&org_id)
            .map(ActionResponse::ok),
        ActionRequest::UpsertOrganizationConfig {
            org_id,
            config,
            name,
        } => service
            .upsert_organization_config(&org_id, &config, name.as_deref())
            .map(ActionResponse::ok),
    };
    outcome.unwrap_or_else(ActionResponse::from)
}

/// Parses a form body and dispatches it.
pub fn handle_form<S: DocumentStore>(service: &RegistryService<S>, body: &str) -> ActionResponse {
    match ActionRequest::from_form(body) {
        Ok(request) => {
            debug!("event=action_dispatch module=action action={}", request.label());
            dispatch(service, request)
        }
        Err(err) => {
            warn!("event=action_parse module=action status=rejected error={err}");
            err.into()
        }
    }
}

fn normalize_action(action: &str) -> String {
    action
        .trim()
        .chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn required<'a>(
    fields: &'a BTreeMap<String, String>,
    field: &'static str,
) -> Result<&'a str, ActionError> {
    optional(fields, field).ok_or(ActionError::MissingField(field))
}

fn optional<'a>(fields: &'a BTreeMap<String, String>, field: &str) -> Option<&'a str> {
    fields
        .get(field)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}
