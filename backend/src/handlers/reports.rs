use axum::{
    extract::{Extension, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::user::AuthUser,
    repositories::client as client_repo,
    services::report,
};

#[derive(Debug, Deserialize)]
pub struct BillingReportQuery {
    pub client_id: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Billing-report PDF for one client over an inclusive date range. The
/// ownership check is the client lookup itself: a foreign client reads as
/// not found.
pub async fn billing_report(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Query(query): Query<BillingReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let client = client_repo::find_for_coach(&pool, &query.client_id, account.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let aggregated =
        report::aggregate(&pool, &config, &client, account.id(), query.from, query.to).await?;
    let bytes = report::render_billing_pdf(&client, &aggregated, &config.time_zone)?;

    let filename = format!(
        "billing-{}-{}.pdf",
        client.full_name.to_lowercase().replace(' ', "-"),
        query.to.format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
