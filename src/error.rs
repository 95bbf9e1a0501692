// ============================================
// src/error.rs
// クイズ全体で使うエラー型
// ============================================

use thiserror::Error;

use crate::session::SessionState;

/// クイズのコア処理で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// 問題ファイルそのものが取得できなかった (ファイルなし / HTTPエラーなど)
    #[error("問題ファイルの読み込みに失敗しました ({location}): {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// 取得はできたが、有効な問題が1件もなかった
    #[error("有効な問題データが読み込めませんでした。")]
    EmptyBank,

    /// 空白だけの回答 (挑戦回数は消費しない)
    #[error("答えを入力してください。")]
    EmptyInput,

    /// 文字数が正解と違う回答 (`SubmitPolicy::RequireFullLength` のときのみ)
    #[error("答えは {expected} 文字です。{expected} 文字ちょうどで入力してください。(入力: {actual} 文字)")]
    IncompleteInput { expected: usize, actual: usize },

    /// 今の状態では呼べない操作を呼んだ (呼び出し側のバグ)
    #[error("{operation} は {state:?} 状態では呼び出せません")]
    InvalidStateTransition {
        operation: &'static str,
        state: SessionState,
    },
}

impl QuizError {
    /// 挑戦回数を消費せずに入力し直せばよいエラーか
    pub fn is_recoverable_input(&self) -> bool {
        matches!(
            self,
            QuizError::EmptyInput | QuizError::IncompleteInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_message_covers_long_input() {
        let err = QuizError::IncompleteInput {
            expected: 3,
            actual: 5,
        };
        let text = err.to_string();
        assert!(text.contains("3 文字ちょうど"), "{text}");
        assert!(text.contains("入力: 5 文字"), "{text}");
        assert!(!text.contains("全て"), "{text}");
    }
}
