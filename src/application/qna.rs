use crate::adapters::postgres::{Qna, QnaComment, QnaRepository};
use crate::application::errors::{BusinessError, Result};
use crate::application::notifications::NotificationService;
use crate::domain::notification::NotificationKind;
use crate::domain::user::User;

/// 質問と回答コメントの詳細
#[derive(Debug, Clone)]
pub struct QnaDetail {
    pub qna: Qna,
    pub comments: Vec<QnaComment>,
}

/// QnAサービス
///
/// 質問は作成者本人と管理者だけが閲覧できる。回答（コメント）が
/// 付くと作成者へ通知、新しい質問は管理者へ通知する。
pub struct QnaService {
    qnas: QnaRepository,
    notifications: NotificationService,
}

impl QnaService {
    pub fn new(qnas: QnaRepository, notifications: NotificationService) -> Self {
        Self {
            qnas,
            notifications,
        }
    }

    pub async fn create(&self, author: &User, title: &str, content: &str) -> Result<Qna> {
        let qna = self.qnas.insert(author.id, title, content).await?;

        let note = format!("新しい質問が投稿されました: {}", qna.title);
        if let Err(e) = self
            .notifications
            .notify_admins(NotificationKind::QnaCreated, &note, Some(qna.id))
            .await
        {
            tracing::warn!(qna_id = qna.id, error = %e, "qna notification failed");
        }

        Ok(qna)
    }

    /// 一覧（管理者は全件、それ以外は本人の質問のみ）
    pub async fn list(
        &self,
        requester: &User,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Qna>, i64)> {
        let author_scope = if requester.is_admin() {
            None
        } else {
            Some(requester.id)
        };

        Ok(self.qnas.page(author_scope, limit, offset).await?)
    }

    pub async fn detail(&self, id: i32, requester: &User) -> Result<QnaDetail> {
        let qna = self.find_visible(id, requester).await?;
        let comments = self.qnas.list_comments(qna.id).await?;

        Ok(QnaDetail { qna, comments })
    }

    pub async fn update(&self, id: i32, requester: &User, title: &str, content: &str) -> Result<()> {
        let qna = self.find_visible(id, requester).await?;
        if qna.author_id != requester.id.value() {
            return Err(BusinessError::Forbidden);
        }

        self.qnas.update(id, title, content).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32, requester: &User) -> Result<()> {
        let qna = self.find_visible(id, requester).await?;
        if qna.author_id != requester.id.value() && !requester.is_admin() {
            return Err(BusinessError::Forbidden);
        }

        self.qnas.soft_delete(id).await?;
        Ok(())
    }

    /// 回答コメントの追加
    ///
    /// 管理者が回答すると質問の作成者へ通知される。
    pub async fn add_comment(&self, qna_id: i32, author: &User, content: &str) -> Result<QnaComment> {
        let qna = self.find_visible(qna_id, author).await?;
        let comment = self.qnas.insert_comment(qna.id, author.id, content).await?;

        if author.is_admin() && qna.author_id != author.id.value() {
            let note = format!("質問「{}」に回答が付きました", qna.title);
            if let Err(e) = self
                .notifications
                .notify_user(
                    crate::domain::UserId::from_raw(qna.author_id),
                    NotificationKind::QnaAnswered,
                    &note,
                    Some(qna.id),
                )
                .await
            {
                tracing::warn!(qna_id = qna.id, error = %e, "answer notification failed");
            }
        }

        Ok(comment)
    }

    pub async fn update_comment(&self, comment_id: i32, requester: &User, content: &str) -> Result<()> {
        let comment = self
            .qnas
            .find_comment(comment_id)
            .await?
            .ok_or(BusinessError::CommentNotFound)?;

        if comment.author_id != requester.id.value() {
            return Err(BusinessError::Forbidden);
        }

        self.qnas.update_comment(comment_id, content).await?;
        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: i32, requester: &User) -> Result<()> {
        let comment = self
            .qnas
            .find_comment(comment_id)
            .await?
            .ok_or(BusinessError::CommentNotFound)?;

        if comment.author_id != requester.id.value() && !requester.is_admin() {
            return Err(BusinessError::Forbidden);
        }

        self.qnas.soft_delete_comment(comment_id).await?;
        Ok(())
    }

    async fn find_visible(&self, id: i32, requester: &User) -> Result<Qna> {
        let qna = self
            .qnas
            .find_by_id(id)
            .await?
            .ok_or(BusinessError::QnaNotFound)?;

        if qna.author_id != requester.id.value() && !requester.is_admin() {
            return Err(BusinessError::Forbidden);
        }

        Ok(qna)
    }
}
