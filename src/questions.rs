/*
 * src/questions.rs
 * お題データ (問題バンク) を管理するモジュール
 */

use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{QuizError, Result};

/// 1ゲームあたりの出題数
pub const DEFAULT_PLAY_SIZE: usize = 10;

/// 同梱のサンプル問題 (1行1問のJSON)
pub const SAMPLE_QUESTIONS: &str = include_str!("data/sample_questions.jsonl");

/// 1問ぶんのデータ。読み込み後は変更しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    answer: String,
    candidates: Vec<String>,
}

impl Question {
    /// 問題文と正解から作る。どちらかが空 (空白のみ) なら `None`。
    /// 正解の前後の空白はここで取り除く (判定時には取り除かない)
    pub fn new(prompt: impl Into<String>, answer: &str) -> Option<Self> {
        let prompt = prompt.into();
        let answer = answer.trim();
        if prompt.trim().is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            prompt,
            answer: answer.to_string(),
            candidates: Vec::new(),
        })
    }

    /// 選択肢 (answer_candidates) を付ける
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// 正解の文字数 (ヒント表示・入力ボックスの数)
    pub fn answer_len(&self) -> usize {
        self.answer.chars().count()
    }
}

/// ファイル1行ぶんのJSON。型が違うフィールドは行ごと捨てる
#[derive(Deserialize)]
struct QuestionRecord {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer_entity: Option<String>,
    #[serde(default)]
    answer_candidates: Option<Value>,
}

impl QuestionRecord {
    fn into_question(self) -> Option<Question> {
        let question = Question::new(self.question?, &self.answer_entity?)?;
        // 選択肢は文字列だけ拾う (なくてもよい)
        let candidates = match self.answer_candidates {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Some(question.with_candidates(candidates))
    }
}

/// 1行をパースする。捨てる理由を `Err` で返す (ログ用)
fn parse_line(line: &str) -> std::result::Result<Question, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("JSON解析エラー - {e}"))?;
    if !value.is_object() {
        return Err("JSONオブジェクトではありません".to_string());
    }
    serde_json::from_value::<QuestionRecord>(value)
        .ok()
        .and_then(QuestionRecord::into_question)
        .ok_or_else(|| "必須項目エラー".to_string())
}

/// 検証済みの問題一式
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// 1行1問のJSONテキストを読み込む。
    /// 壊れた行・項目が足りない行は黙って捨て、1問も残らなければ `EmptyBank`
    pub fn parse(raw: &str) -> Result<Self> {
        let mut questions = Vec::new();
        let mut dropped = 0usize;

        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(question) => questions.push(question),
                Err(reason) => {
                    dropped += 1;
                    warn!("{}行目: {}", index + 1, reason);
                }
            }
        }

        info!(
            "有効問題数: {}, 破棄した行: {}",
            questions.len(),
            dropped
        );

        if questions.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 今回プレイする問題を選ぶ
    pub fn sample<R: Rng + ?Sized>(&self, play_size: usize, rng: &mut R) -> Vec<&Question> {
        sample(&self.questions, play_size, rng)
    }
}

/// 全体をシャッフルしたコピーから、先頭 `min(play_size, len)` 問を取り出す
pub fn sample<'a, R: Rng + ?Sized>(
    questions: &'a [Question],
    play_size: usize,
    rng: &mut R,
) -> Vec<&'a Question> {
    let mut shuffled: Vec<&Question> = questions.iter().collect();
    shuffled.shuffle(rng);
    shuffled.truncate(play_size.min(questions.len()));
    shuffled
}
