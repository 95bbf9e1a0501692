// 1ゲームを最初から最後まで通すテスト。
// ライブラリ部分だけを使うので端末なしで動く。

use quizwiz::session::points_for_attempt;
use quizwiz::{
    FinalResult, MAX_ATTEMPTS, QuestionBank, QuizError, QuizSession, SessionState, Verdict,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bank_of_twelve() -> QuestionBank {
    let mut raw = String::new();
    for i in 0..12 {
        raw.push_str(&format!(
            "{{\"question\": \"問題{i}\", \"answer_entity\": \"こたえ{i}\"}}\n"
        ));
        // 壊れた行が混じっていても読み飛ばされる
        raw.push_str("{broken\n\n");
    }
    QuestionBank::parse(&raw).unwrap()
}

/// 1問ごとの回答のしかた
enum Plan {
    CorrectAfter(u32),
    Exhaust,
    GiveUpAfter(u32),
}

#[test]
fn ten_question_game_tallies_points() {
    let bank = bank_of_twelve();
    assert_eq!(bank.len(), 12);

    let mut rng = StdRng::seed_from_u64(2024);
    let mut session = QuizSession::start(bank.sample(10, &mut rng));
    assert_eq!(session.total_questions(), 10);

    let plans = [
        Plan::CorrectAfter(0),
        Plan::CorrectAfter(0),
        Plan::CorrectAfter(0),
        Plan::CorrectAfter(1),
        Plan::CorrectAfter(1),
        Plan::CorrectAfter(2),
        Plan::CorrectAfter(2),
        Plan::Exhaust,
        Plan::GiveUpAfter(0),
        Plan::GiveUpAfter(1),
    ];

    let mut expected_points = 0;
    let mut played = 0;
    for plan in plans {
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert_eq!(session.attempts_remaining(), MAX_ATTEMPTS);
        let answer = session.current_question().unwrap().answer().to_string();

        match plan {
            Plan::CorrectAfter(misses) => {
                for _ in 0..misses {
                    assert_eq!(session.evaluate("はずれ").unwrap().verdict, Verdict::Incorrect);
                }
                let result = session.evaluate(&answer).unwrap();
                assert_eq!(result.points_awarded(), points_for_attempt(misses + 1));
                expected_points += result.points_awarded();
            }
            Plan::Exhaust => {
                for _ in 0..MAX_ATTEMPTS {
                    assert_eq!(
                        session.evaluate("   "),
                        Err(QuizError::EmptyInput),
                        "空の回答は回数を消費しない"
                    );
                    session.evaluate("はずれ").unwrap();
                }
                assert_eq!(session.attempts_remaining(), 0);
            }
            Plan::GiveUpAfter(misses) => {
                for _ in 0..misses {
                    session.evaluate("はずれ").unwrap();
                }
                assert_eq!(session.give_up().unwrap().answer, answer);
            }
        }

        assert_eq!(session.state(), SessionState::Resolved);
        session.advance().unwrap();
        played += 1;
    }

    assert_eq!(played, 10);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(expected_points, 3 * 10 + 2 * 5 + 2 * 3);
    assert_eq!(
        session.final_result(),
        FinalResult {
            correct_count: 7,
            total_points: expected_points,
            total_questions: 10,
        }
    );
}

#[test]
fn retry_samples_a_new_game_from_the_same_bank() {
    let bank = bank_of_twelve();
    let mut rng = StdRng::seed_from_u64(1);

    let first = QuizSession::start(bank.sample(10, &mut rng));
    let second = QuizSession::start(bank.sample(10, &mut rng));

    assert_eq!(first.total_points(), 0);
    assert_eq!(second.total_points(), 0);
    assert_eq!(second.state(), SessionState::AwaitingAnswer);
    assert_eq!(second.total_questions(), 10);
}
