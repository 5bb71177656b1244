use crate::adapters::postgres::{NotificationRepository, UserRepository};
use crate::application::errors::{BusinessError, Result};
use crate::domain::UserId;
use crate::domain::notification::{Notification, NotificationKind, NotificationStatus};
use crate::domain::user::User;

/// 通知サービス
///
/// 既読化・削除は状態遷移のみで、行は物理削除しない。
/// 他人の通知への操作は Forbidden。
#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
    users: UserRepository,
}

impl NotificationService {
    pub fn new(notifications: NotificationRepository, users: UserRepository) -> Self {
        Self {
            notifications,
            users,
        }
    }

    pub async fn list(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64)> {
        Ok(self
            .notifications
            .page_by_user(user_id, limit, offset)
            .await?)
    }

    pub async fn get(&self, id: i32, requester: &User) -> Result<Notification> {
        let notification = self
            .notifications
            .find_by_id(id)
            .await?
            .ok_or(BusinessError::NotificationNotFound)?;

        if notification.user_id != requester.id && !requester.is_admin() {
            return Err(BusinessError::Forbidden);
        }

        Ok(notification)
    }

    pub async fn mark_read(&self, id: i32, requester: &User) -> Result<()> {
        self.transition(id, requester, NotificationStatus::Read).await
    }

    /// ソフトデリート（DELETE状態への遷移）
    pub async fn mark_deleted(&self, id: i32, requester: &User) -> Result<()> {
        self.transition(id, requester, NotificationStatus::Delete)
            .await
    }

    async fn transition(&self, id: i32, requester: &User, status: NotificationStatus) -> Result<()> {
        let notification = self.get(id, requester).await?;
        self.notifications
            .update_status(notification.id, status)
            .await?;
        Ok(())
    }

    pub async fn has_unread(&self, user_id: UserId) -> Result<bool> {
        Ok(self.notifications.has_unread(user_id).await?)
    }

    /// 利用者1人への通知作成
    pub async fn notify_user(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        content: &str,
        resource_id: Option<i32>,
    ) -> Result<()> {
        self.notifications
            .insert(user_id, kind, content, resource_id)
            .await?;
        Ok(())
    }

    /// 全管理者への通知作成（ファンアウト）
    pub async fn notify_admins(
        &self,
        kind: NotificationKind,
        content: &str,
        resource_id: Option<i32>,
    ) -> Result<()> {
        for admin_id in self.users.find_admin_ids().await? {
            self.notifications
                .insert(admin_id, kind, content, resource_id)
                .await?;
        }
        Ok(())
    }
}
