//! User-facing (Korean) messages for each `DomainError`.
//!
//! `Display` on `DomainError` stays English for logs.

use domains::DomainError;

/// Shown when a comment could not be persisted.
pub const COMMENT_WRITE_FAILED: &str = "댓글 등록에 실패했습니다.";

pub fn user_message(err: &DomainError) -> String {
    match err {
        DomainError::InvalidDate => "유효하지 않은 날짜입니다.".to_string(),
        DomainError::EmptyContent => "댓글 내용을 입력해주세요.".to_string(),
        DomainError::ContentTooLong { max } => format!("댓글은 {max}자 이내로 작성해주세요."),
        DomainError::MalformedBody => "잘못된 요청입니다.".to_string(),
        DomainError::RateLimited => "너무 많은 요청입니다. 잠시 후 다시 시도해주세요.".to_string(),
        DomainError::StoreUnavailable(_) => "일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string(),
        DomainError::Unauthorized => "Unauthorized".to_string(),
        DomainError::NotFound(_) => "데이터를 찾을 수 없습니다.".to_string(),
    }
}
