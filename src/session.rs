// ============================================
// src/session.rs
// 1ゲームぶんの進行状態 (出題・判定・得点)
// ============================================

use log::debug;

use crate::diff::{self, Feedback};
use crate::error::{QuizError, Result};
use crate::questions::Question;

/// 1問あたりの挑戦回数
pub const MAX_ATTEMPTS: u32 = 3;

// 何回目で正解したかによる獲得ポイント
pub const POINTS_ATTEMPT_1: u32 = 10;
pub const POINTS_ATTEMPT_2: u32 = 5;
pub const POINTS_ATTEMPT_3: u32 = 3;

/// `attempt` 回目 (1始まり) の正解で得られるポイント
pub fn points_for_attempt(attempt: u32) -> u32 {
    match attempt {
        1 => POINTS_ATTEMPT_1,
        2 => POINTS_ATTEMPT_2,
        3 => POINTS_ATTEMPT_3,
        _ => 0,
    }
}

/// 文字数が足りない回答をどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// 途中までの回答も判定する (足りない位置は `Absent`)
    #[default]
    AllowPartial,
    /// 正解と同じ文字数になるまで受け付けない
    RequireFullLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 回答待ち
    AwaitingAnswer,
    /// 正解・ギブアップ・回数切れのいずれかで、次へ進むのを待っている
    Resolved,
    /// 全問終了
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct { points: u32 },
    /// 不正解だが、まだ挑戦できる
    Incorrect,
    /// 不正解で挑戦回数を使い切った
    OutOfAttempts { answer: String },
}

/// `evaluate` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// 正解の文字数ぶんの判定列
    pub feedback: Vec<Feedback>,
    pub attempts_remaining: u32,
}

impl Evaluation {
    pub fn is_correct(&self) -> bool {
        matches!(self.verdict, Verdict::Correct { .. })
    }

    pub fn points_awarded(&self) -> u32 {
        match self.verdict {
            Verdict::Correct { points } => points,
            _ => 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.verdict, Verdict::OutOfAttempts { .. })
    }
}

/// `give_up` の結果 (表示用の正解)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveUp {
    pub answer: String,
}

/// 最終結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalResult {
    pub correct_count: u32,
    pub total_points: u32,
    pub total_questions: usize,
}

/// 1ゲームの状態。問題は `QuestionBank` から借りる
#[derive(Debug)]
pub struct QuizSession<'a> {
    play_set: Vec<&'a Question>,
    current_index: usize,
    attempts_remaining: u32,
    total_points: u32,
    correct_count: u32,
    state: SessionState,
    policy: SubmitPolicy,
}

impl<'a> QuizSession<'a> {
    /// ゲーム開始。問題が0問ならいきなり `Finished`
    pub fn start(play_set: Vec<&'a Question>) -> Self {
        Self::with_policy(play_set, SubmitPolicy::default())
    }

    pub fn with_policy(play_set: Vec<&'a Question>, policy: SubmitPolicy) -> Self {
        let state = if play_set.is_empty() {
            SessionState::Finished
        } else {
            SessionState::AwaitingAnswer
        };
        debug!("ゲーム開始: {}問 ({:?})", play_set.len(), policy);
        Self {
            play_set,
            current_index: 0,
            attempts_remaining: MAX_ATTEMPTS,
            total_points: 0,
            correct_count: 0,
            state,
            policy,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 出題中の問題 (`Finished` なら `None`)
    pub fn current_question(&self) -> Option<&'a Question> {
        self.play_set.get(self.current_index).copied()
    }

    /// 0始まりの出題位置
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.play_set.len()
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidStateTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// 回答を判定する。
    /// 空の回答 (と、設定によっては文字数不足の回答) は挑戦回数を消費せずに `Err` を返す
    pub fn evaluate(&mut self, input: &str) -> Result<Evaluation> {
        self.require(SessionState::AwaitingAnswer, "evaluate")?;
        let question = self.play_set[self.current_index];
        let expected = question.answer();

        if input.trim().is_empty() {
            return Err(QuizError::EmptyInput);
        }
        if self.policy == SubmitPolicy::RequireFullLength {
            let actual = input.chars().count();
            if actual != question.answer_len() {
                return Err(QuizError::IncompleteInput {
                    expected: question.answer_len(),
                    actual,
                });
            }
        }

        // 前後の空白も含めて完全一致のときだけ正解
        if input == expected {
            let attempt = MAX_ATTEMPTS - self.attempts_remaining + 1;
            let points = points_for_attempt(attempt);
            self.total_points += points;
            self.correct_count += 1;
            self.state = SessionState::Resolved;
            debug!("正解 ({attempt}回目): +{points}");
            return Ok(Evaluation {
                verdict: Verdict::Correct { points },
                feedback: vec![Feedback::Exact; question.answer_len()],
                attempts_remaining: self.attempts_remaining,
            });
        }

        self.attempts_remaining -= 1;
        let feedback = diff::diff(input, expected);
        debug!(
            "不正解: {} (残り{}回)",
            diff::symbols(&feedback),
            self.attempts_remaining
        );

        let verdict = if self.attempts_remaining == 0 {
            self.state = SessionState::Resolved;
            Verdict::OutOfAttempts {
                answer: expected.to_string(),
            }
        } else {
            Verdict::Incorrect
        };

        Ok(Evaluation {
            verdict,
            feedback,
            attempts_remaining: self.attempts_remaining,
        })
    }

    /// ギブアップ。ポイントなし、正解数も増えない
    pub fn give_up(&mut self) -> Result<GiveUp> {
        self.require(SessionState::AwaitingAnswer, "give_up")?;
        self.attempts_remaining = 0;
        self.state = SessionState::Resolved;
        let answer = self.play_set[self.current_index].answer().to_string();
        debug!("ギブアップ: 正解は「{answer}」");
        Ok(GiveUp { answer })
    }

    /// 次の問題へ進む
    pub fn advance(&mut self) -> Result<SessionState> {
        self.require(SessionState::Resolved, "advance")?;
        self.current_index += 1;
        if self.current_index < self.play_set.len() {
            self.attempts_remaining = MAX_ATTEMPTS;
            self.state = SessionState::AwaitingAnswer;
        } else {
            self.state = SessionState::Finished;
            debug!(
                "全問終了: {}/{}問正解, {}ポイント",
                self.correct_count,
                self.play_set.len(),
                self.total_points
            );
        }
        Ok(self.state)
    }

    /// 集計。途中でも読めるが、確定するのは `Finished` になってから
    pub fn final_result(&self) -> FinalResult {
        FinalResult {
            correct_count: self.correct_count,
            total_points: self.total_points,
            total_questions: self.play_set.len(),
        }
    }
}
