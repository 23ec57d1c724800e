use crate::common::{ApiResult, UserId};
use crate::domains::dashboard::models::DashboardStats;
use crate::domains::notifications::models::Notification;
use crate::domains::partner_requests::models::PartnerRequest;
use crate::kernel::ServerDeps;

pub async fn dashboard_stats(user_id: UserId, deps: &ServerDeps) -> ApiResult<DashboardStats> {
    let mut stats = DashboardStats::load_registry(&deps.db_pool).await?;
    stats.unread_notifications = Notification::count_unread(user_id, &deps.db_pool).await?;
    stats.pending_partner_requests = PartnerRequest::count_pending(&deps.db_pool).await?;
    Ok(stats)
}
