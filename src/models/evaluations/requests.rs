use serde::Deserialize;
use ts_rs::TS;

use crate::models::evaluations::entities::{RatingCategory, Ratings};

// 提交互评请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct SubmitEvaluationRequest {
    pub conceptual_rating: Option<f64>,
    pub practical_rating: Option<f64>,
    pub cooperation_rating: Option<f64>,
    pub work_ethic_rating: Option<f64>,
    pub comment: Option<String>,
}

impl SubmitEvaluationRequest {
    /// 校验评分齐全且在 [min, max] 内，返回规范化后的评分与评语
    pub fn validate(
        &self,
        min_rating: f64,
        max_rating: f64,
        max_comment_length: usize,
    ) -> Result<(Ratings, Option<String>), String> {
        let pick = |category: RatingCategory, value: Option<f64>| -> Result<f64, String> {
            let value = value.ok_or_else(|| format!("{category} rating is required"))?;
            if !value.is_finite() || value < min_rating || value > max_rating {
                return Err(format!(
                    "{category} rating must be between {min_rating} and {max_rating}"
                ));
            }
            Ok(value)
        };

        let ratings = Ratings {
            conceptual: pick(RatingCategory::Conceptual, self.conceptual_rating)?,
            practical: pick(RatingCategory::Practical, self.practical_rating)?,
            cooperation: pick(RatingCategory::Cooperation, self.cooperation_rating)?,
            work_ethic: pick(RatingCategory::WorkEthic, self.work_ethic_rating)?,
        };

        let comment = match self.comment.as_deref().map(str::trim) {
            Some(c) if c.chars().count() > max_comment_length => {
                return Err(format!(
                    "Comment must be at most {max_comment_length} characters"
                ));
            }
            Some("") | None => None,
            Some(c) => Some(c.to_string()),
        };

        Ok((ratings, comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> SubmitEvaluationRequest {
        SubmitEvaluationRequest {
            conceptual_rating: Some(4.0),
            practical_rating: Some(5.0),
            cooperation_rating: Some(6.0),
            work_ethic_rating: Some(7.0),
            comment: Some("  Great teammate  ".to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_ratings_in_range() {
        let (ratings, comment) = full_request().validate(1.0, 7.0, 100).unwrap();
        assert_eq!(ratings.conceptual, 4.0);
        assert_eq!(ratings.work_ethic, 7.0);
        assert_eq!(comment.as_deref(), Some("Great teammate"));
    }

    #[test]
    fn test_validate_rejects_missing_rating() {
        let mut req = full_request();
        req.cooperation_rating = None;
        let err = req.validate(1.0, 7.0, 100).unwrap_err();
        assert!(err.contains("cooperation"));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut req = full_request();
        req.practical_rating = Some(7.5);
        assert!(req.validate(1.0, 7.0, 100).is_err());

        req.practical_rating = Some(0.0);
        assert!(req.validate(1.0, 7.0, 100).is_err());

        req.practical_rating = Some(f64::NAN);
        assert!(req.validate(1.0, 7.0, 100).is_err());
    }

    #[test]
    fn test_validate_comment_length_and_blank() {
        let mut req = full_request();
        req.comment = Some("x".repeat(11));
        assert!(req.validate(1.0, 7.0, 10).is_err());

        req.comment = Some("   ".to_string());
        let (_, comment) = req.validate(1.0, 7.0, 10).unwrap();
        assert!(comment.is_none());
    }
}
