// ============================================
// src/config.rs
// コマンドライン引数と実行時の設定
// ============================================

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::questions::DEFAULT_PLAY_SIZE;
use crate::session::SubmitPolicy;
use crate::source::QuestionSource;

/// QUIZ WiZ. - 文字数ヒント付きの日本語クイズ
#[derive(Debug, Parser)]
#[command(name = "quizwiz", version, about)]
pub struct Cli {
    /// 問題ファイルのパスまたはURL (1行1問のJSON)
    #[arg(short, long, value_name = "PATH|URL", conflicts_with = "sample")]
    pub questions: Option<String>,

    /// 同梱のサンプル問題で遊ぶ
    #[arg(long)]
    pub sample: bool,

    /// 1ゲームの出題数
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_PLAY_SIZE as u32,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub play_size: u32,

    /// シャッフルの乱数シード (同じ値なら同じ出題順)
    #[arg(long)]
    pub seed: Option<u64>,

    /// 正解と同じ文字数になるまで回答を受け付けない
    #[arg(long)]
    pub require_full_length: bool,

    /// 開始確認をスキップする
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// 解決済みの設定
#[derive(Debug, Clone)]
pub struct Config {
    pub source: QuestionSource,
    pub play_size: usize,
    pub seed: Option<u64>,
    pub policy: SubmitPolicy,
    pub skip_prompt: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let source = if cli.sample {
            QuestionSource::Sample
        } else {
            match cli.questions.as_deref() {
                Some(arg) => QuestionSource::from_arg(arg),
                None => QuestionSource::default_location(),
            }
        };
        let policy = if cli.require_full_length {
            SubmitPolicy::RequireFullLength
        } else {
            SubmitPolicy::AllowPartial
        };
        Self {
            source,
            play_size: cli.play_size as usize,
            seed: cli.seed,
            policy,
            skip_prompt: cli.yes,
        }
    }
}

impl Config {
    /// シャッフル用の乱数生成器 (シード指定がなければOSの乱数で初期化)
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
