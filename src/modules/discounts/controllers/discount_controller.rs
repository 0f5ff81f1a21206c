use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::core::Currency;
use crate::middleware::tenant::CompanyId;
use crate::modules::discounts::models::{
    CreateDiscountRequest, DiscountResponse, DocumentDirection, ItemNature, UpdateDiscountRequest,
};
use crate::modules::discounts::services::{DiscountCalculator, DiscountResolver, DiscountService};

/// Query parameters for listing discounts
#[derive(Debug, Deserialize)]
pub struct ListDiscountsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Request body for the resolution preview of a prospective document line
#[derive(Debug, Deserialize)]
pub struct ResolveDiscountRequest {
    /// Explicit discount reference; absent falls back to the company default
    pub discount_id: Option<i64>,
    pub line_scope: ItemNature,
    pub direction: DocumentDirection,
    /// Defaults to now; normally the document's effective date
    pub as_of: Option<DateTime<Utc>>,
    pub base_amount: Decimal,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
pub struct ResolveDiscountResponse {
    pub discount: Option<DiscountResponse>,
    pub discount_amount: String,
}

/// The acting user for audit references, when the gateway forwards one
fn acting_user(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse().ok())
}

/// Create a new discount
/// POST /discounts
pub async fn create_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    http_req: HttpRequest,
    request: web::Json<CreateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let discount = service
        .create_discount(request.into_inner(), company_id.0, acting_user(&http_req))
        .await?;

    Ok(HttpResponse::Created().json(discount))
}

/// Get discount by ID
/// GET /discounts/{id}
pub async fn get_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let discount = service.get_discount(path.into_inner(), company_id.0).await?;

    Ok(HttpResponse::Ok().json(discount))
}

/// List the company's discounts
/// GET /discounts
pub async fn list_discounts(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    query: web::Query<ListDiscountsQuery>,
) -> Result<HttpResponse, AppError> {
    let discounts = service
        .list_discounts(company_id.0, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(discounts))
}

/// Update a discount
/// PUT /discounts/{id}
pub async fn update_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    http_req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let discount = service
        .update_discount(
            path.into_inner(),
            request.into_inner(),
            company_id.0,
            acting_user(&http_req),
        )
        .await?;

    Ok(HttpResponse::Ok().json(discount))
}

/// Enable a discount
/// POST /discounts/{id}/enable
pub async fn enable_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    http_req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let discount = service
        .set_enabled(path.into_inner(), company_id.0, true, acting_user(&http_req))
        .await?;

    Ok(HttpResponse::Ok().json(discount))
}

/// Disable a discount (the normal decommission path)
/// POST /discounts/{id}/disable
pub async fn disable_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    http_req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let discount = service
        .set_enabled(
            path.into_inner(),
            company_id.0,
            false,
            acting_user(&http_req),
        )
        .await?;

    Ok(HttpResponse::Ok().json(discount))
}

/// Hard-delete a discount that nothing references
/// DELETE /discounts/{id}
pub async fn delete_discount(
    service: web::Data<Arc<DiscountService>>,
    company_id: CompanyId,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service
        .delete_discount(path.into_inner(), company_id.0)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Resolution and computation preview for a prospective document line
/// POST /discounts/resolve
pub async fn resolve_discount(
    resolver: web::Data<Arc<DiscountResolver>>,
    company_id: CompanyId,
    request: web::Json<ResolveDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let as_of = request.as_of.unwrap_or_else(Utc::now);

    let resolved = resolver
        .resolve(
            company_id.0,
            request.discount_id,
            request.line_scope,
            request.direction,
            as_of,
        )
        .await?;

    let calculator = DiscountCalculator::new();
    let discount_amount =
        calculator.apply(resolved.as_ref(), request.base_amount, request.currency)?;

    Ok(HttpResponse::Ok().json(ResolveDiscountResponse {
        discount: resolved.map(Into::into),
        discount_amount: discount_amount.to_string(),
    }))
}

/// Configure discount routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discounts")
            .route("", web::post().to(create_discount))
            .route("", web::get().to(list_discounts))
            .route("/resolve", web::post().to(resolve_discount))
            .route("/{id}", web::get().to(get_discount))
            .route("/{id}", web::put().to(update_discount))
            .route("/{id}", web::delete().to(delete_discount))
            .route("/{id}/enable", web::post().to(enable_discount))
            .route("/{id}/disable", web::post().to(disable_discount)),
    );
}
