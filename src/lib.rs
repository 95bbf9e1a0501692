//! QUIZ WiZ. のコア
//!
//! 問題バンクの読み込み・出題の抽選 (`questions`)、文字単位の判定 (`diff`)、
//! 1ゲームの進行 (`session`) を提供する。画面表示は `main.rs` 側。

pub mod config;
pub mod diff;
pub mod error;
pub mod questions;
pub mod session;
pub mod source;

pub use diff::Feedback;
pub use error::{QuizError, Result};
pub use questions::{DEFAULT_PLAY_SIZE, Question, QuestionBank};
pub use session::{
    Evaluation, FinalResult, GiveUp, MAX_ATTEMPTS, QuizSession, SessionState, SubmitPolicy,
    Verdict,
};
pub use source::QuestionSource;
