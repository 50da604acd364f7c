pub struct GradingService;

impl GradingService {
    /// Exact, case-sensitive comparison against the stored answer.
    pub fn is_correct(user_answer: &str, correct_answer: &str) -> bool {
        user_answer == correct_answer
    }

    /// `floor(correct * 100 / total)`, or `0` for a quiz without questions.
    pub fn score(correct_count: i32, total_questions: i32) -> i32 {
        if total_questions <= 0 {
            return 0;
        }
        let score = i64::from(correct_count) * 100 / i64::from(total_questions);
        i32::try_from(score).unwrap_or(i32::MAX)
    }
}
