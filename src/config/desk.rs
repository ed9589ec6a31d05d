use std::time::Duration;

use crate::config::helpers::{
    EnvSource, optional_env, parse_bool_env, parse_number_env, parse_string_env, process_env,
};
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::workflow::WorkflowPolicy;

/// Resolved settings for collections, invoices and invites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    pub organization_code: String,
    pub invoice_number_prefix: String,
    pub invoice_due_days: i64,
    pub invite_validity_days: i64,
    pub currency_symbol: String,
    pub workflow: WorkflowPolicy,
    pub backend_latency: Duration,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            organization_code: "ACME".to_string(),
            invoice_number_prefix: "INV".to_string(),
            invoice_due_days: 30,
            invite_validity_days: 30,
            currency_symbol: "$".to_string(),
            workflow: WorkflowPolicy::Permissive,
            backend_latency: Duration::ZERO,
        }
    }
}

/// Logging controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Keep code prefixes uppercase alphanumeric so generated codes stay readable.
pub fn sanitize_code_prefix(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn validate_code_prefix(key: &str, raw: &str) -> Result<String, ConfigError> {
    let sanitized = sanitize_code_prefix(raw);
    if sanitized.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "prefix must contain at least one letter or digit".to_string(),
        });
    }
    Ok(sanitized)
}

fn validate_days(key: &str, days: i64, allow_zero: bool) -> Result<i64, ConfigError> {
    let floor = if allow_zero { 0 } else { 1 };
    if !(floor..=3650).contains(&days) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be between {floor} and 3650 days, got {days}"),
        });
    }
    Ok(days)
}

impl DeskConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve_with(settings, &process_env)
    }

    pub(crate) fn resolve_with(settings: &Settings, env: EnvSource<'_>) -> Result<Self, ConfigError> {
        let desk = &settings.desk;

        let workflow_raw = parse_string_env(env, "BIZDESK_WORKFLOW", desk.workflow.clone())?;
        let workflow = WorkflowPolicy::parse(&workflow_raw).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "BIZDESK_WORKFLOW".to_string(),
                message: format!("unsupported workflow '{workflow_raw}'"),
            }
        })?;

        let currency_symbol = match optional_env(env, "BIZDESK_CURRENCY_SYMBOL")? {
            Some(symbol) => symbol,
            None if desk.currency_symbol.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: "BIZDESK_CURRENCY_SYMBOL".to_string(),
                    message: "currency symbol must not be empty".to_string(),
                });
            }
            None => desk.currency_symbol.trim().to_string(),
        };

        Ok(Self {
            organization_code: {
                let raw =
                    parse_string_env(env, "BIZDESK_ORG_CODE", desk.organization_code.clone())?;
                validate_code_prefix("BIZDESK_ORG_CODE", &raw)?
            },
            invoice_number_prefix: {
                let raw = parse_string_env(
                    env,
                    "BIZDESK_INVOICE_PREFIX",
                    desk.invoice_number_prefix.clone(),
                )?;
                validate_code_prefix("BIZDESK_INVOICE_PREFIX", &raw)?
            },
            invoice_due_days: validate_days(
                "BIZDESK_INVOICE_DUE_DAYS",
                parse_number_env(env, "BIZDESK_INVOICE_DUE_DAYS", desk.invoice_due_days)?,
                true,
            )?,
            invite_validity_days: validate_days(
                "BIZDESK_INVITE_VALIDITY_DAYS",
                parse_number_env(
                    env,
                    "BIZDESK_INVITE_VALIDITY_DAYS",
                    desk.invite_validity_days,
                )?,
                false,
            )?,
            currency_symbol,
            workflow,
            backend_latency: Duration::from_millis(parse_number_env(
                env,
                "BIZDESK_BACKEND_LATENCY_MS",
                desk.backend_latency_ms,
            )?),
        })
    }
}

impl LoggingConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve_with(settings, &process_env)
    }

    pub(crate) fn resolve_with(settings: &Settings, env: EnvSource<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: parse_string_env(env, "BIZDESK_LOG", settings.logging.filter.clone())?,
            json: parse_bool_env(env, "BIZDESK_LOG_JSON", settings.logging.json)?,
        })
    }
}
