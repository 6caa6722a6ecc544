//! Export creation and deletion.

use crate::error::{ApiError, ApiResult};
use crate::export::ExportSummary;
use crate::middleware::CurrentActor;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use inkwell_domain::{ExportFormat, ExportId, ExportKind};

fn success_message(kind: ExportKind, format: ExportFormat) -> String {
    let subject = match kind {
        ExportKind::Users => "Users",
        ExportKind::Posts => "Posts",
    };
    let target = match format {
        ExportFormat::Pdf => "PDF",
        ExportFormat::Excel => "Excel",
    };
    format!("{subject} exported to {target} successfully")
}

async fn run(
    state: &AppState,
    current: &CurrentActor,
    kind: ExportKind,
    format: ExportFormat,
) -> ApiResult<ApiResponse<ExportSummary>> {
    let summary = state.exports.run(kind, format, current.user.id).await?;
    Ok(ApiResponse::ok(success_message(kind, format), summary))
}

pub async fn users_pdf(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<ApiResponse<ExportSummary>> {
    run(&state, &current, ExportKind::Users, ExportFormat::Pdf).await
}

pub async fn users_excel(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<ApiResponse<ExportSummary>> {
    run(&state, &current, ExportKind::Users, ExportFormat::Excel).await
}

pub async fn posts_pdf(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<ApiResponse<ExportSummary>> {
    run(&state, &current, ExportKind::Posts, ExportFormat::Pdf).await
}

pub async fn posts_excel(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<ApiResponse<ExportSummary>> {
    run(&state, &current, ExportKind::Posts, ExportFormat::Excel).await
}

/// Requires `delete exports`, checked by the route layer.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<ExportId>,
) -> ApiResult<ApiResponse<()>> {
    if !state.exports.delete(id).await? {
        return Err(ApiError::NotFound("Export"));
    }
    Ok(ApiResponse::message("Export deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_messages() {
        assert_eq!(
            success_message(ExportKind::Users, ExportFormat::Pdf),
            "Users exported to PDF successfully"
        );
        assert_eq!(
            success_message(ExportKind::Posts, ExportFormat::Excel),
            "Posts exported to Excel successfully"
        );
    }
}
