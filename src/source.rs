// ============================================
// src/source.rs
// 問題ファイルの取得 (ローカルファイル / URL / 同梱サンプル)
// ============================================

use directories::ProjectDirs;
use log::info;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};
use crate::questions::SAMPLE_QUESTIONS;

/// 既定の問題ファイル名
pub const DEFAULT_QUESTIONS_FILE: &str = "train_questions.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    File(PathBuf),
    Url(String),
    /// バイナリに同梱したサンプル問題
    Sample,
}

impl QuestionSource {
    /// コマンドライン引数から作る (http:// / https:// で始まればURL)
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            QuestionSource::Url(arg.to_string())
        } else {
            QuestionSource::File(PathBuf::from(arg))
        }
    }

    /// MARK:既定の問題ファイルの場所を決める
    /// カレントディレクトリ → OSごとのデータディレクトリ の順に探す
    pub fn default_location() -> Self {
        let local = PathBuf::from(DEFAULT_QUESTIONS_FILE);
        if local.exists() {
            return QuestionSource::File(local);
        }

        if let Some(proj_dirs) = ProjectDirs::from("jp", "Fukumoto0141", "QUIZ_WIZ") {
            let in_data_dir = proj_dirs.data_dir().join(DEFAULT_QUESTIONS_FILE);
            if in_data_dir.exists() {
                return QuestionSource::File(in_data_dir);
            }
        }

        // どこにもなければカレントディレクトリのパスのまま (読み込み時にエラー)
        QuestionSource::File(local)
    }

    /// エラー表示用の場所
    pub fn location(&self) -> String {
        match self {
            QuestionSource::File(path) => path.display().to_string(),
            QuestionSource::Url(url) => url.clone(),
            QuestionSource::Sample => "サンプル問題".to_string(),
        }
    }

    /// MARK:問題テキストを一度だけ取得する
    pub fn fetch(&self) -> Result<String> {
        info!("問題を読み込みます: {}", self.location());
        match self {
            QuestionSource::File(path) => read_file(path),
            QuestionSource::Url(url) => fetch_url(url),
            QuestionSource::Sample => Ok(SAMPLE_QUESTIONS.to_string()),
        }
    }
}

fn unavailable(location: impl Into<String>, reason: impl ToString) -> QuizError {
    QuizError::SourceUnavailable {
        location: location.into(),
        reason: reason.to_string(),
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| unavailable(path.display().to_string(), e))
}

fn fetch_url(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url).map_err(|e| unavailable(url, e))?;
    let status = response.status();
    info!("レスポンス - ステータス: {status}");
    if !status.is_success() {
        return Err(unavailable(url, format!("HTTP {status}")));
    }
    response.text().map_err(|e| unavailable(url, e))
}
