use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use device_registry_core::{AdapterInstanceId, DeviceId, GatewayId, StoreFacade, TenantId};
use serde::Deserialize;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;

#[derive(Deserialize)]
pub struct SetGatewayRequest {
    #[serde(rename = "gateway-id")]
    pub gateway_id: String,
}

#[derive(Deserialize)]
pub struct AdapterInstanceRequest {
    #[serde(rename = "adapter-instance-id")]
    pub adapter_instance_id: String,
}

#[derive(Deserialize, Default)]
pub struct ViaGatewaysQuery {
    pub via: Option<String>,
}

fn parse_via(query: &ViaGatewaysQuery) -> Result<Vec<GatewayId>, ApiError> {
    let Some(via) = &query.via else {
        return Ok(Vec::new());
    };
    via.split(',')
        .filter(|segment| !segment.is_empty())
        .map(|segment| GatewayId::new(segment).map_err(ApiError::from))
        .collect()
}

pub async fn put_gateway<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((tenant, device)): Path<(String, String)>,
    Json(body): Json<SetGatewayRequest>,
) -> Result<(), ApiError> {
    let span = tracing::Span::current();
    let tenant = TenantId::new(tenant)?;
    let device = DeviceId::new(device)?;
    let gateway = GatewayId::new(body.gateway_id)?;
    state
        .resolver
        .set_last_known_gateway_for_device(&tenant, &device, &gateway, &span)
        .await?;
    Ok(())
}

pub async fn get_gateway<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((tenant, device)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let span = tracing::Span::current();
    let tenant = TenantId::new(tenant)?;
    let device = DeviceId::new(device)?;
    let result = state
        .resolver
        .get_last_known_gateway_for_device(&tenant, &device, &span)
        .await?;
    Ok(Json(
        serde_json::to_value(result).expect("GatewayResult always serializes"),
    ))
}

pub async fn put_adapter_instance<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((tenant, device)): Path<(String, String)>,
    Json(body): Json<AdapterInstanceRequest>,
) -> Result<(), ApiError> {
    let span = tracing::Span::current();
    let tenant = TenantId::new(tenant)?;
    let device = DeviceId::new(device)?;
    let adapter_instance = AdapterInstanceId::new(body.adapter_instance_id)?;
    state
        .resolver
        .set_command_handling_adapter_instance(&tenant, &device, &adapter_instance, &span)
        .await?;
    Ok(())
}

pub async fn delete_adapter_instance<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((tenant, device)): Path<(String, String)>,
    Json(body): Json<AdapterInstanceRequest>,
) -> Result<(), ApiError> {
    let span = tracing::Span::current();
    let tenant = TenantId::new(tenant)?;
    let device = DeviceId::new(device)?;
    let adapter_instance = AdapterInstanceId::new(body.adapter_instance_id)?;
    state
        .resolver
        .remove_command_handling_adapter_instance(&tenant, &device, &adapter_instance, &span)
        .await?;
    Ok(())
}

pub async fn get_adapter_instances<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((tenant, device)): Path<(String, String)>,
    Query(query): Query<ViaGatewaysQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let span = tracing::Span::current();
    let tenant = TenantId::new(tenant)?;
    let device = DeviceId::new(device)?;
    let via_gateways = parse_via(&query)?;
    let result = state
        .resolver
        .get_command_handling_adapter_instances(&tenant, &device, &via_gateways, &span)
        .await?;
    Ok(Json(
        serde_json::to_value(result).expect("AdapterInstancesResult always serializes"),
    ))
}
