use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::tenant::CompanyId;
use crate::modules::settings::models::UpdateDefaultSettingRequest;
use crate::modules::settings::services::DefaultSettingService;

/// Get the company's default discount links
/// GET /settings/defaults
pub async fn get_defaults(
    service: web::Data<Arc<DefaultSettingService>>,
    company_id: CompanyId,
) -> Result<HttpResponse, AppError> {
    let defaults = service.get_defaults(company_id.0).await?;

    Ok(HttpResponse::Ok().json(defaults))
}

/// Replace the company's default discount links
/// PUT /settings/defaults
pub async fn update_defaults(
    service: web::Data<Arc<DefaultSettingService>>,
    company_id: CompanyId,
    request: web::Json<UpdateDefaultSettingRequest>,
) -> Result<HttpResponse, AppError> {
    let defaults = service
        .update_defaults(request.into_inner(), company_id.0)
        .await?;

    Ok(HttpResponse::Ok().json(defaults))
}

/// Configure settings routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("/defaults", web::get().to(get_defaults))
            .route("/defaults", web::put().to(update_defaults)),
    );
}
