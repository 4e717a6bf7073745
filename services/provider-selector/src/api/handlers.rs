use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{error, info};

use crate::channel::{providers_for, CatalogError, ChannelType, ProviderId, CHANNELS_ORDER};
use crate::selector::{map_fallback_provider, SelectProviderCommand, SelectionError};
use crate::storage::{NewIntegration, NewMessage, StorageError};

use super::types::{
    CatalogQuery, CatalogResponse, ChannelCatalog, CreateIntegrationRequest, ErrorResponse,
    FallbackQuery, FallbackResponse, IntegrationResponse, ListIntegrationsResponse,
    ProviderSummary, RecordMessageRequest, RecordMessageResponse, SelectProviderRequest,
    SelectProviderResponse, SetActiveRequest, UsageResponse,
};
use super::ApiState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub async fn select_provider(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SelectProviderRequest>,
) -> ApiResult<SelectProviderResponse> {
    require_non_empty("organization_id", &request.organization_id)?;
    require_non_empty("environment_id", &request.environment_id)?;
    require_non_empty("user_id", &request.user_id)?;
    let channel = parse_channel(&request.channel)?;

    let command = SelectProviderCommand {
        organization_id: request.organization_id,
        environment_id: request.environment_id,
        channel,
        user_id: request.user_id,
    };

    match state.selector.resolve(&command) {
        Ok(Some(integration)) => Ok(Json(SelectProviderResponse {
            provider_id: Some(integration.provider_id),
            delivery_provider_id: Some(integration.delivery_provider_id),
        })),
        Ok(None) => Ok(Json(SelectProviderResponse {
            provider_id: None,
            delivery_provider_id: None,
        })),
        Err(err) => Err(selection_error(err)),
    }
}

pub async fn fallback_provider(
    Query(query): Query<FallbackQuery>,
) -> ApiResult<FallbackResponse> {
    let channel = parse_channel(&query.channel)?;
    let provider_id = query
        .provider_id
        .parse::<ProviderId>()
        .map_err(catalog_error)?;

    Ok(Json(FallbackResponse {
        channel,
        provider_id,
        fallback_provider_id: map_fallback_provider(channel, provider_id),
    }))
}

pub async fn list_providers(Query(query): Query<CatalogQuery>) -> ApiResult<CatalogResponse> {
    let search = query.search.as_deref();
    let channels = CHANNELS_ORDER
        .iter()
        .map(|&channel| ChannelCatalog {
            channel,
            step_name: channel.step_name().to_string(),
            providers: providers_for(channel, search)
                .into_iter()
                .map(|provider| ProviderSummary {
                    provider_id: provider,
                    display_name: provider.display_name().to_string(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(CatalogResponse { channels }))
}

pub async fn environment_usage(
    State(state): State<Arc<ApiState>>,
    Path(environment_id): Path<String>,
) -> ApiResult<UsageResponse> {
    let channels = state
        .selector
        .channel_status(&environment_id, Utc::now())
        .map_err(selection_error)?;

    Ok(Json(UsageResponse {
        environment_id,
        channels,
    }))
}

pub async fn record_message(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RecordMessageRequest>,
) -> ApiResult<RecordMessageResponse> {
    require_non_empty("organization_id", &request.organization_id)?;
    require_non_empty("environment_id", &request.environment_id)?;
    let channel = parse_channel(&request.channel)?;
    let provider_id =
        ProviderId::parse_for_channel(&request.provider_id, channel).map_err(catalog_error)?;

    let message = state
        .selector
        .messages()
        .record_message(NewMessage {
            organization_id: request.organization_id,
            environment_id: request.environment_id,
            channel,
            provider_id,
            created_at: request.created_at,
        })
        .map_err(storage_error)?;

    Ok(Json(RecordMessageResponse { message }))
}

pub async fn create_integration(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateIntegrationRequest>,
) -> ApiResult<IntegrationResponse> {
    require_non_empty("organization_id", &request.organization_id)?;
    require_non_empty("environment_id", &request.environment_id)?;
    let channel = parse_channel(&request.channel)?;
    let provider_id =
        ProviderId::parse_for_channel(&request.provider_id, channel).map_err(catalog_error)?;

    let integration = state
        .selector
        .integrations()
        .upsert_integration(NewIntegration {
            organization_id: request.organization_id,
            environment_id: request.environment_id,
            channel,
            provider_id,
            name: request.name,
            identifier: request.identifier,
            active: request.active.unwrap_or(true),
        })
        .map_err(storage_error)?;

    info!(
        integration_id = %integration.id,
        environment_id = %integration.environment_id,
        channel = %integration.channel,
        provider_id = %integration.provider_id,
        active = integration.active,
        "integration saved"
    );

    Ok(Json(IntegrationResponse { integration }))
}

pub async fn list_integrations(
    State(state): State<Arc<ApiState>>,
    Path(environment_id): Path<String>,
) -> ApiResult<ListIntegrationsResponse> {
    let integrations = state
        .selector
        .integrations()
        .list_integrations(&environment_id)
        .map_err(storage_error)?;

    Ok(Json(ListIntegrationsResponse { integrations }))
}

pub async fn set_integration_active(
    State(state): State<Arc<ApiState>>,
    Path(integration_id): Path<String>,
    Json(request): Json<SetActiveRequest>,
) -> ApiResult<IntegrationResponse> {
    let integration = state
        .selector
        .integrations()
        .set_integration_active(&integration_id, request.active)
        .map_err(storage_error)?;

    Ok(Json(IntegrationResponse { integration }))
}

pub async fn health_check() -> ApiResult<serde_json::Value> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "hosted-provider-selector"
    })))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if value.trim().is_empty() {
        return Err(bad_request(
            &format!("invalid_{field}"),
            &format!("{field} cannot be empty"),
        ));
    }
    Ok(())
}

fn parse_channel(raw: &str) -> Result<ChannelType, (StatusCode, Json<ErrorResponse>)> {
    raw.parse::<ChannelType>().map_err(catalog_error)
}

fn catalog_error(err: CatalogError) -> (StatusCode, Json<ErrorResponse>) {
    let code = match err {
        CatalogError::UnknownChannel(_) => "invalid_channel",
        CatalogError::UnknownProvider(_) => "invalid_provider_id",
        CatalogError::UnsupportedChannel { .. } => "unsupported_channel",
    };
    bad_request(code, &err.to_string())
}

fn selection_error(err: SelectionError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        SelectionError::LimitExceeded {
            channel,
            limit,
            current,
        } => {
            let message = err.to_string();
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: message,
                    code: "limit_exceeded".to_string(),
                    details: Some(serde_json::json!({
                        "channel": channel,
                        "limit": limit,
                        "current": current,
                    })),
                }),
            )
        }
        SelectionError::HostedUnavailable(channel) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: err.to_string(),
                code: "hosted_unavailable".to_string(),
                details: Some(serde_json::json!({ "channel": channel })),
            }),
        ),
        SelectionError::StorageError(storage) => storage_error(storage),
    }
}

fn storage_error(err: StorageError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        StorageError::IntegrationNotFound(_) => not_found("integration_not_found", &err.to_string()),
        StorageError::InvalidRecord(_) => bad_request("invalid_record", &err.to_string()),
        other => internal_error(other),
    }
}

fn bad_request(code: &str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn not_found(code: &str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "provider API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(serde_json::json!({ "message": err.to_string() })),
        }),
    )
}
