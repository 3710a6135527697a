//! Guess matching
//!
//! 回答とお題の比較は前後の空白除去と小文字化だけを行う。
//! 完全一致でなければ編集距離が 2 以下のとき「惜しい」と判定する。

/// 「惜しい」と判定する最大編集距離
pub const CLOSE_GUESS_DISTANCE: usize = 2;

/// 正解でないチャットを他のプレイヤーに見せるときの伏せ字
pub const MASKED_GUESS: &str = "****";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Exact,
    Close,
    NoMatch,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// 回答をお題と比較する
pub fn match_guess(guess: &str, secret: &str) -> GuessOutcome {
    let guess = normalize(guess);
    let secret = normalize(secret);
    if guess == secret {
        return GuessOutcome::Exact;
    }
    if edit_distance(&guess, &secret) <= CLOSE_GUESS_DISTANCE {
        GuessOutcome::Close
    } else {
        GuessOutcome::NoMatch
    }
}

/// 文字単位のレーベンシュタイン距離（挿入・削除・置換のコストは 1）
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_known_values() {
        // テスト項目: 代表的な編集距離
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(edit_distance("cat", "cat"), 0);
        assert_eq!(edit_distance("cat", "bat"), 1);
        assert_eq!(edit_distance("cat", "cart"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_edit_distance_to_self_is_zero() {
        // テスト項目: 任意の文字列と自身との距離は 0
        // given (前提条件):
        let samples = ["", "a", "elephant", "ice cream", "café"];

        // when (操作) / then (期待する結果):
        for sample in samples {
            assert_eq!(edit_distance(sample, sample), 0);
        }
    }

    #[test]
    fn test_match_is_case_insensitive_and_trimmed() {
        // テスト項目: 大文字小文字と前後の空白は無視される
        // given (前提条件):
        let guess = "  ElePhant ";

        // when (操作):
        let outcome = match_guess(guess, "elephant");

        // then (期待する結果):
        assert_eq!(outcome, GuessOutcome::Exact);
    }

    #[test]
    fn test_close_and_miss_thresholds() {
        // テスト項目: 距離 2 以下は Close、3 以上は NoMatch
        // given (前提条件):
        let secret = "giraffe";

        // when (操作):
        let close = match_guess("girafe", secret);
        let two_away = match_guess("jiraffa", secret);
        let miss = match_guess("dog", secret);

        // then (期待する結果):
        assert_eq!(close, GuessOutcome::Close);
        assert_eq!(two_away, GuessOutcome::Close);
        assert_eq!(miss, GuessOutcome::NoMatch);
    }

    #[test]
    fn test_multibyte_characters_count_once() {
        // テスト項目: マルチバイト文字は 1 文字として比較される
        // given (前提条件) / when (操作):
        let distance = edit_distance("café", "cafe");

        // then (期待する結果):
        assert_eq!(distance, 1);
    }
}
