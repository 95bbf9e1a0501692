// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{self, stdout};
use std::mem;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use console::style;
use dialoguer::Confirm;
use log::{error, info};
use thiserror::Error;

use quizwiz::config::{Cli, Config};
use quizwiz::diff::symbols;
use quizwiz::{
    Feedback, FinalResult, MAX_ATTEMPTS, Question, QuestionBank, QuizError, QuizSession,
    SessionState, Verdict,
};

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

// --------------------------------------------------
// エラー
// --------------------------------------------------

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error("端末の操作に失敗しました: {0}")]
    Terminal(#[from] io::Error),
    #[error("入力の受け付けに失敗しました: {0}")]
    Prompt(#[from] dialoguer::Error),
}

// --------------------------------------------------
// データ構造
// --------------------------------------------------

/// メッセージの色分け
#[derive(Debug, Clone, Copy)]
enum Tone {
    Correct,
    Incorrect,
    Notice,
}

#[derive(Debug, Clone)]
struct Message {
    text: String,
    tone: Tone,
}

impl Message {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// 画面の状態を管理する
struct AppState<'a> {
    session: QuizSession<'a>,
    /// 入力ボックスの中身 (1ボックス1文字)
    input: Vec<char>,
    /// 直前に判定した回答
    last_input: Vec<char>,
    /// 直前の判定結果
    feedback: Vec<Feedback>,
    message: Option<Message>,
}

impl<'a> AppState<'a> {
    fn new(session: QuizSession<'a>) -> Self {
        Self {
            session,
            input: Vec::new(),
            last_input: Vec::new(),
            feedback: Vec::new(),
            message: None,
        }
    }

    fn current_question(&self) -> Option<&'a Question> {
        self.session.current_question()
    }

    /// 文字入力。ボックスの数 (= 正解の文字数) より多くは入らない
    fn handle_char_input(&mut self, c: char) {
        let Some(question) = self.current_question() else {
            return;
        };
        if self.input.len() < question.answer_len() {
            self.input.push(c);
        }
    }

    fn handle_backspace(&mut self) {
        self.input.pop();
    }

    /// 回答を送信する
    fn submit(&mut self) -> Result<(), QuizError> {
        let answer: String = self.input.iter().collect();
        match self.session.evaluate(&answer) {
            Ok(evaluation) => {
                self.message = Some(match &evaluation.verdict {
                    Verdict::Correct { points } => {
                        Message::new(format!("正解！ 🎉 {points}ポイント獲得！"), Tone::Correct)
                    }
                    Verdict::Incorrect => Message::new("不正解です。", Tone::Incorrect),
                    Verdict::OutOfAttempts { answer } => {
                        Message::new(format!("残念！正解は「{answer}」でした。"), Tone::Incorrect)
                    }
                });
                self.last_input = mem::take(&mut self.input);
                self.feedback = evaluation.feedback;
                Ok(())
            }
            // 挑戦回数は減らないので、そのまま入力し直してもらう
            Err(e) if e.is_recoverable_input() => {
                self.message = Some(Message::new(e.to_string(), Tone::Notice));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn give_up(&mut self) -> Result<(), QuizError> {
        let give_up = self.session.give_up()?;
        self.input.clear();
        self.message = Some(Message::new(
            format!("正解は「{}」でした。", give_up.answer),
            Tone::Notice,
        ));
        Ok(())
    }

    /// Esc で抜けるときの結果。全問終了後なら結果を確定し、途中なら破棄する
    fn on_escape(&self) -> Option<FinalResult> {
        match self.session.state() {
            SessionState::Finished => Some(self.session.final_result()),
            _ => None,
        }
    }

    /// 次の問題に進む
    fn next_question(&mut self) -> Result<SessionState, QuizError> {
        let state = self.session.advance()?;
        self.input.clear();
        self.last_input.clear();
        self.feedback.clear();
        self.message = None;
        Ok(state)
    }
}

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> ExitCode {
    pretty_env_logger::init();
    let config = Config::from(Cli::parse());

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:?}");
            eprintln!("{} {}", style("エラー:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    // 問題は起動時に一度だけ読み込む (リトライでは読み込み直さない)
    let raw = config.source.fetch()?;
    let bank = QuestionBank::parse(&raw)?;
    info!("問題データの読み込み完了: {}問", bank.len());

    if !config.skip_prompt {
        let start = Confirm::new()
            .with_prompt(format!(
                "{}問の問題を読み込みました。ゲームを開始しますか？",
                bank.len()
            ))
            .default(true)
            .interact()?;
        if !start {
            return Ok(());
        }
    }

    let mut rng = config.rng();
    loop {
        let play_set = bank.sample(config.play_size, &mut rng);
        info!("今回プレイする問題数: {}", play_set.len());
        let session = QuizSession::with_policy(play_set, config.policy);

        let mut terminal = setup_terminal()?;
        let outcome = run_app(&mut terminal, AppState::new(session));
        restore_terminal(&mut terminal)?;

        // Esc で中断したときはそのまま終了
        let Some(result) = outcome? else {
            break;
        };
        print_results(&result);

        let again = Confirm::new()
            .with_prompt("もう一度プレイしますか？")
            .default(true)
            .interact()?;
        if !again {
            break;
        }
    }
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    // 途中で失敗したら raw モードを戻してからエラーを返す
    or_rollback(
        enter_screen().and_then(|()| Terminal::new(CrosstermBackend::new(stdout()))),
        leave_screen,
    )
}

/// `result` がエラーなら `rollback` を呼んでから返す
fn or_rollback<T>(result: io::Result<T>, rollback: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        rollback();
    }
    result
}

/// 後始末専用。ここでの失敗は元のエラーを優先して捨てる
fn leave_screen() {
    let _ = stdout().execute(Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

fn enter_screen() -> io::Result<()> {
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    Ok(())
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

/// 全問終わったら結果を返す。Esc で中断したら `None`
fn run_app(
    terminal: &mut Terminal<impl Backend>,
    mut app_state: AppState<'_>,
) -> Result<Option<FinalResult>, AppError> {
    loop {
        terminal.draw(|f| ui(f, &app_state))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Esc {
            return Ok(app_state.on_escape());
        }

        match (app_state.session.state(), key.code) {
            (SessionState::AwaitingAnswer, KeyCode::Enter) => app_state.submit()?,
            (SessionState::AwaitingAnswer, KeyCode::Tab) => app_state.give_up()?,
            (SessionState::AwaitingAnswer, KeyCode::Backspace) => app_state.handle_backspace(),
            (SessionState::AwaitingAnswer, KeyCode::Char(c)) => app_state.handle_char_input(c),
            (SessionState::Resolved, KeyCode::Enter) => {
                app_state.next_question()?;
            }
            (SessionState::Finished, KeyCode::Enter) => {
                return Ok(Some(app_state.session.final_result()));
            }
            _ => {}
        }
    }
}

/// TUI を抜けたあとに結果を表示する
fn print_results(result: &FinalResult) {
    println!("{}", style("===== 結果 =====").bold());
    println!(
        "正解数: {} / {} 問",
        style(result.correct_count).green().bold(),
        result.total_questions
    );
    println!("総ポイント: {}", style(result.total_points).yellow().bold());
}

// --------------------------------------------------
// UI描画
// --------------------------------------------------

fn ui(f: &mut Frame, app_state: &AppState) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default().borders(Borders::ALL).title("Quiz Wiz !");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    match app_state.current_question() {
        Some(question) => ui_question(f, inner_area, app_state, question),
        None => ui_results(f, inner_area, &app_state.session.final_result()),
    }
}

fn ui_question(f: &mut Frame, area: Rect, app_state: &AppState, question: &Question) {
    let session = &app_state.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 進捗と得点
            Constraint::Length(1), // [1] 空白
            Constraint::Length(3), // [2] 問題文
            Constraint::Length(1), // [3] 文字数ヒント
            Constraint::Length(1), // [4] 入力ボックス
            Constraint::Length(1), // [5] 直前の回答 (色分け)
            Constraint::Length(1), // [6] 判定記号
            Constraint::Length(1), // [7] メッセージ
            Constraint::Length(1), // [8] 挑戦回数
            Constraint::Min(1),    // [9] 操作説明
        ])
        .split(area);

    // 0. 進捗ゲージ
    let total = session.total_questions();
    let ratio = if total > 0 {
        session.current_index() as f64 / total as f64
    } else {
        0.0
    };
    let label = format!(
        "{}問中 {}問目 / 得点: {}",
        total,
        session.current_index() + 1,
        session.total_points()
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio.min(1.0))
        .label(label);
    f.render_widget(gauge, chunks[0]);

    // 2. 問題文
    f.render_widget(
        Paragraph::new(question.prompt())
            .style(Style::default().fg(Color::White).bold())
            .wrap(Wrap { trim: true })
            .centered(),
        chunks[2],
    );

    // 3. 文字数ヒント
    f.render_widget(
        Paragraph::new(format!("答えは {} 文字です。", question.answer_len()))
            .style(Style::default().fg(Color::Gray))
            .centered(),
        chunks[3],
    );

    // 4. 入力ボックス
    let awaiting = session.state() == SessionState::AwaitingAnswer;
    let mut boxes = Vec::new();
    for i in 0..question.answer_len() {
        let text = match app_state.input.get(i) {
            Some(c) => format!("[{c}]"),
            None => "[　]".to_string(),
        };
        let style = if !awaiting {
            Style::default().fg(Color::DarkGray)
        } else if i == app_state.input.len() {
            // カーソル位置
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::White)
        };
        boxes.push(Span::styled(text, style));
    }
    f.render_widget(Paragraph::new(Line::from(boxes)).centered(), chunks[4]);

    // 5-6. 直前の判定
    if !app_state.feedback.is_empty() {
        let spans: Vec<Span> = app_state
            .feedback
            .iter()
            .enumerate()
            .map(|(i, mark)| {
                let c = app_state.last_input.get(i).copied().unwrap_or('・');
                let bg = match mark {
                    Feedback::Exact => Color::Green,
                    Feedback::Present => Color::Yellow,
                    Feedback::Absent => Color::DarkGray,
                };
                Span::styled(format!("[{c}]"), Style::default().fg(Color::Black).bg(bg))
            })
            .collect();
        f.render_widget(Paragraph::new(Line::from(spans)).centered(), chunks[5]);
        f.render_widget(
            Paragraph::new(symbols(&app_state.feedback)).centered(),
            chunks[6],
        );
    }

    // 7. メッセージ
    if let Some(message) = &app_state.message {
        let color = match message.tone {
            Tone::Correct => Color::Green,
            Tone::Incorrect => Color::Red,
            Tone::Notice => Color::Yellow,
        };
        f.render_widget(
            Paragraph::new(message.text.as_str())
                .style(Style::default().fg(color))
                .centered(),
            chunks[7],
        );
    }

    // 8. 挑戦回数
    f.render_widget(
        Paragraph::new(format!(
            "挑戦回数: あと {} 回 (最大 {} 回)",
            session.attempts_remaining(),
            MAX_ATTEMPTS
        ))
        .style(Style::default().fg(Color::Gray))
        .centered(),
        chunks[8],
    );

    // 9. 操作説明
    let help = if awaiting {
        "Enter: 回答 / Tab: ギブアップ / Esc: 終了"
    } else {
        "Enter: 次の問題へ / Esc: 終了"
    };
    f.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[9],
    );
}

fn ui_results(f: &mut Frame, area: Rect, result: &FinalResult) {
    let lines = vec![
        Line::from("結果発表").style(Style::default().fg(Color::White).bold()),
        Line::from(""),
        Line::from(format!(
            "正解数: {} / {} 問",
            result.correct_count, result.total_questions
        ))
        .style(Style::default().fg(Color::Green)),
        Line::from(format!("総ポイント: {}", result.total_points))
            .style(Style::default().fg(Color::Yellow)),
        Line::from(""),
        Line::from("Enter / Esc: 結果を確定").style(Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(lines).centered(), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizwiz::SubmitPolicy;

    fn question() -> Question {
        Question::new("車は？", "くるま").unwrap()
    }

    #[test]
    fn typing_stops_at_answer_length() {
        let q = question();
        let mut app_state = AppState::new(QuizSession::start(vec![&q]));
        for c in "くるまやさん".chars().take(q.answer_len() + 2) {
            app_state.handle_char_input(c);
        }
        assert_eq!(app_state.input.len(), q.answer_len());
        assert_eq!(app_state.input.iter().collect::<String>(), "くるま");

        app_state.handle_backspace();
        assert_eq!(app_state.input.len(), q.answer_len() - 1);
    }

    #[test]
    fn blank_submit_asks_again() {
        let q = question();
        let mut app_state = AppState::new(QuizSession::start(vec![&q]));
        app_state.handle_char_input(' ');
        app_state.submit().unwrap();

        let message = app_state.message.as_ref().unwrap();
        assert!(matches!(message.tone, Tone::Notice));
        assert_eq!(app_state.session.attempts_remaining(), MAX_ATTEMPTS);
        assert_eq!(app_state.session.state(), SessionState::AwaitingAnswer);
        assert!(app_state.feedback.is_empty());
    }

    #[test]
    fn short_submit_asks_again_when_full_length_required() {
        let q = question();
        let session = QuizSession::with_policy(vec![&q], SubmitPolicy::RequireFullLength);
        let mut app_state = AppState::new(session);
        app_state.handle_char_input('く');
        app_state.submit().unwrap();

        let message = app_state.message.as_ref().unwrap();
        assert!(matches!(message.tone, Tone::Notice));
        assert_eq!(app_state.session.attempts_remaining(), MAX_ATTEMPTS);
        // 入力はそのまま残り、続きを打てる
        assert_eq!(app_state.input, vec!['く']);
    }

    #[test]
    fn escape_keeps_the_tally_only_after_the_last_question() {
        let q = question();
        let mut app_state = AppState::new(QuizSession::start(vec![&q]));
        assert_eq!(app_state.on_escape(), None);

        for c in "くるま".chars() {
            app_state.handle_char_input(c);
        }
        app_state.submit().unwrap();
        assert_eq!(app_state.on_escape(), None);

        assert_eq!(app_state.next_question().unwrap(), SessionState::Finished);
        assert_eq!(
            app_state.on_escape(),
            Some(FinalResult {
                correct_count: 1,
                total_points: 10,
                total_questions: 1,
            })
        );
    }

    #[test]
    fn failed_setup_runs_rollback() {
        let mut rolled_back = false;
        let result: io::Result<()> = or_rollback(Err(io::Error::other("no tty")), || {
            rolled_back = true
        });
        assert!(result.is_err());
        assert!(rolled_back);

        let mut rolled_back = false;
        assert_eq!(or_rollback(Ok(1), || rolled_back = true).unwrap(), 1);
        assert!(!rolled_back);
    }

    #[test]
    fn wrong_submit_records_feedback() {
        let q = question();
        let mut app_state = AppState::new(QuizSession::start(vec![&q]));
        for c in "くるみ".chars() {
            app_state.handle_char_input(c);
        }
        app_state.submit().unwrap();

        assert!(matches!(app_state.message.as_ref().unwrap().tone, Tone::Incorrect));
        assert_eq!(app_state.session.attempts_remaining(), MAX_ATTEMPTS - 1);
        assert_eq!(app_state.feedback, vec![Feedback::Exact, Feedback::Exact, Feedback::Absent]);
        assert!(app_state.input.is_empty());
    }
}
