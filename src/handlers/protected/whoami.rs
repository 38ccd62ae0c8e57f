use crate::middleware::{ApiResponse, RequestContext};

/// GET /api/v1/auth/me, /api/v1/admin/me, /api/super/me - current principal
///
/// Answers from the verified token and resolved tenant; no directory lookup.
pub async fn whoami(context: RequestContext) -> ApiResponse<RequestContext> {
    ApiResponse::success(context)
}
