use crate::config::{MAX_STREAK_MULTIPLIER, SPEED_BONUS_WINDOW_SECONDS, STREAK_MULTIPLIER_STEP};

/// Tactical themes with a dedicated goal line, in priority order.
const TACTIC_GOALS: [(&str, &str); 4] = [
    ("fork", "Find the fork"),
    ("pin", "Find the pin"),
    ("skewer", "Find the skewer"),
    ("doubleCheck", "Find the double check"),
];

pub fn streak_multiplier(streak: u32) -> f64 {
    (1.0 + streak as f64 * STREAK_MULTIPLIER_STEP).min(MAX_STREAK_MULTIPLIER)
}

/// 2x for an instant solve, decaying linearly to 1x at 15 seconds and beyond.
pub fn speed_bonus(solve_seconds: f64) -> f64 {
    (2.0 - solve_seconds / SPEED_BONUS_WINDOW_SECONDS).max(1.0)
}

/// `round(base_points * streak_multiplier * speed_bonus)`, using the streak
/// before this solve is counted.
pub fn calculate_puzzle_score(base_points: u32, streak: u32, solve_seconds: f64) -> u32 {
    let score = base_points as f64 * streak_multiplier(streak) * speed_bonus(solve_seconds);
    score.round() as u32
}

/// Side to move from the FEN's active-color field. Anything but `w` is Black.
pub fn side_to_move(fen: &str) -> &'static str {
    match fen.split_whitespace().nth(1) {
        Some("w") => "White",
        _ => "Black",
    }
}

/// Human-readable objective, e.g. `"White to move – Mate in 2"`.
pub fn goal_text(fen: &str, themes: &str) -> String {
    let side = side_to_move(fen);
    let has = |tag: &str| themes.split_whitespace().any(|t| t == tag);

    let goal = if has("mateIn1") {
        "Mate in 1"
    } else if has("mateIn2") {
        "Mate in 2"
    } else if has("mateIn3") {
        "Mate in 3"
    } else {
        TACTIC_GOALS
            .iter()
            .find(|(tag, _)| has(tag))
            .map(|(_, goal)| *goal)
            .unwrap_or("Find the best tactic")
    };

    format!("{} to move – {}", side, goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    const BLACK_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 2 3";

    #[test]
    fn test_score_examples() {
        assert_eq!(calculate_puzzle_score(100, 0, 15.0), 100);
        assert_eq!(calculate_puzzle_score(100, 10, 0.0), 400);
        // Multiplier caps at 3x.
        assert_eq!(calculate_puzzle_score(100, 30, 15.0), 300);
        assert_eq!(calculate_puzzle_score(100, 30, 0.0), 600);
    }

    #[test]
    fn test_score_bounds() {
        for streak in 0..50 {
            for tenths in 0..400 {
                let score = calculate_puzzle_score(100, streak, tenths as f64 / 10.0);
                assert!((100..=600).contains(&score), "streak {} t {}", streak, tenths);
            }
        }
    }

    #[test]
    fn test_speed_bonus_decays_to_one() {
        assert_eq!(speed_bonus(0.0), 2.0);
        assert!((speed_bonus(7.5) - 1.5).abs() < 1e-9);
        assert_eq!(speed_bonus(15.0), 1.0);
        assert_eq!(speed_bonus(120.0), 1.0);
    }

    #[test]
    fn test_goal_mate() {
        assert_eq!(goal_text(WHITE_FEN, "mateIn2 middlegame"), "White to move – Mate in 2");
        // mateIn1 wins over everything else.
        assert_eq!(goal_text(BLACK_FEN, "fork mateIn3 mateIn1"), "Black to move – Mate in 1");
        assert_eq!(goal_text(WHITE_FEN, "pin mateIn3"), "White to move – Mate in 3");
    }

    #[test]
    fn test_goal_tactics_in_fixed_order() {
        assert_eq!(goal_text(BLACK_FEN, "fork attack"), "Black to move – Find the fork");
        assert_eq!(goal_text(WHITE_FEN, "skewer pin"), "White to move – Find the pin");
        assert_eq!(
            goal_text(WHITE_FEN, "doubleCheck endgame"),
            "White to move – Find the double check"
        );
    }

    #[test]
    fn test_goal_fallback() {
        assert_eq!(
            goal_text(WHITE_FEN, "crushing long"),
            "White to move – Find the best tactic"
        );
        assert_eq!(goal_text("garbage", ""), "Black to move – Find the best tactic");
    }
}
