// ============================================
// src/diff.rs
// 回答と正解の文字単位の比較 (Wordle方式)
// ============================================

use std::collections::HashMap;
use std::fmt;

/// 1文字ぶんの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// 同じ位置に同じ文字
    Exact,
    /// 別の位置に含まれている
    Present,
    /// 含まれていない (または未入力)
    Absent,
}

impl Feedback {
    pub fn symbol(self) -> &'static str {
        match self {
            Feedback::Exact => "✅",
            Feedback::Present => "☑️",
            Feedback::Absent => "❌",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 判定列を "✅ ❌ ☑️" のような表示用文字列にする
pub fn symbols(feedback: &[Feedback]) -> String {
    feedback
        .iter()
        .map(|f| f.symbol())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `input` を `expected` と比較して、`expected` の文字数ぶんの判定列を返す。
///
/// 先に位置一致 (`Exact`) をすべて確定させ、残った文字数の範囲でだけ
/// `Present` を付ける。同じ文字が何度出てきても、正解に含まれる個数より
/// 多くは評価しない。入力が短い場合、足りない位置は `Absent`。
pub fn diff(input: &str, expected: &str) -> Vec<Feedback> {
    let input: Vec<char> = input.chars().collect();
    let expected: Vec<char> = expected.chars().collect();

    // 正解に含まれる文字ごとの残り個数
    let mut remaining: HashMap<char, usize> = HashMap::new();
    for &c in &expected {
        *remaining.entry(c).or_insert(0) += 1;
    }

    let overlap = input.len().min(expected.len());
    let mut marks: Vec<Option<Feedback>> = vec![None; expected.len()];

    // 1周目: 位置一致
    for i in 0..overlap {
        if input[i] == expected[i] {
            marks[i] = Some(Feedback::Exact);
            if let Some(count) = remaining.get_mut(&input[i]) {
                *count -= 1;
            }
        }
    }

    // 2周目: 別の位置にあるか
    for i in 0..overlap {
        if marks[i].is_some() {
            continue;
        }
        marks[i] = Some(match remaining.get_mut(&input[i]) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Feedback::Present
            }
            _ => Feedback::Absent,
        });
    }

    marks
        .into_iter()
        .map(|m| m.unwrap_or(Feedback::Absent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Feedback::*;

    #[test]
    fn identical_strings_are_all_exact() {
        assert_eq!(diff("ねこ", "ねこ"), vec![Exact, Exact]);
    }

    #[test]
    fn duplicate_letters_are_credited_only_once() {
        // 'A' は2個: 位置0で1個、位置1で1個消費。'B' は1個なので位置2で使い切る
        assert_eq!(diff("AABB", "ABCA"), vec![Exact, Present, Present, Absent]);
    }

    #[test]
    fn exact_matches_win_over_earlier_present_matches() {
        // 位置0の 'ま' より先に位置1の完全一致が 'ま' を消費する
        assert_eq!(diff("まま", "やま"), vec![Absent, Exact]);
    }

    #[test]
    fn short_input_is_padded_with_absent() {
        assert_eq!(diff("と", "としょかん"), vec![Exact, Absent, Absent, Absent, Absent]);
        assert_eq!(diff("", "うみ"), vec![Absent, Absent]);
    }

    #[test]
    fn long_input_is_cut_to_answer_length() {
        assert_eq!(diff("そらまめ", "そら"), vec![Exact, Exact]);
    }

    #[test]
    fn swapped_characters_are_present() {
        assert_eq!(diff("こね", "ねこ"), vec![Present, Present]);
    }

    #[test]
    fn symbols_are_space_separated() {
        assert_eq!(symbols(&[Exact, Present, Absent]), "✅ ☑️ ❌");
        assert_eq!(Absent.to_string(), "❌");
    }
}
