use crate::adapters::postgres::{Notice, NoticeRepository};
use crate::application::errors::{BusinessError, Result};

/// お知らせサービス
///
/// 作成・更新・削除は管理者のみ（API層でガードされる）。
/// 閲覧のたびに閲覧数を加算する。
pub struct NoticeService {
    notices: NoticeRepository,
}

impl NoticeService {
    pub fn new(notices: NoticeRepository) -> Self {
        Self { notices }
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Notice> {
        let notice = self.notices.insert(title, content).await?;
        tracing::info!(notice_id = notice.id, "notice created");
        Ok(notice)
    }

    pub async fn list(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notice>, i64)> {
        Ok(self.notices.page(keyword, limit, offset).await?)
    }

    /// 詳細取得（閲覧数を加算する）
    pub async fn read(&self, id: i32) -> Result<Notice> {
        self.notices.increment_view_count(id).await?;
        self.notices
            .find_by_id(id)
            .await?
            .ok_or(BusinessError::NoticeNotFound)
    }

    pub async fn update(&self, id: i32, title: &str, content: &str) -> Result<()> {
        let updated = self.notices.update(id, title, content).await?;
        if updated == 0 {
            return Err(BusinessError::NoticeNotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let deleted = self.notices.soft_delete(id).await?;
        if deleted == 0 {
            return Err(BusinessError::NoticeNotFound);
        }
        Ok(())
    }
}
