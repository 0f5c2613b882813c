use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 互评状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "evaluation.ts")]
pub enum EvaluationStatus {
    Pending,   // 待评
    Completed, // 已完成（终态）
}

impl EvaluationStatus {
    pub const PENDING: &'static str = "pending";
    pub const COMPLETED: &'static str = "completed";
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationStatus::Pending => write!(f, "{}", EvaluationStatus::PENDING),
            EvaluationStatus::Completed => write!(f, "{}", EvaluationStatus::COMPLETED),
        }
    }
}

impl std::str::FromStr for EvaluationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EvaluationStatus::PENDING => Ok(EvaluationStatus::Pending),
            EvaluationStatus::COMPLETED => Ok(EvaluationStatus::Completed),
            _ => Err(format!("Invalid evaluation status: {s}")),
        }
    }
}

// 评分维度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "evaluation.ts")]
pub enum RatingCategory {
    Conceptual,
    Practical,
    Cooperation,
    WorkEthic,
}

impl RatingCategory {
    pub const ALL: [RatingCategory; 4] = [
        RatingCategory::Conceptual,
        RatingCategory::Practical,
        RatingCategory::Cooperation,
        RatingCategory::WorkEthic,
    ];
}

impl std::fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RatingCategory::Conceptual => "conceptual",
            RatingCategory::Practical => "practical",
            RatingCategory::Cooperation => "cooperation",
            RatingCategory::WorkEthic => "work_ethic",
        };
        f.write_str(name)
    }
}

// 一次互评的四项评分，仅在已完成时存在
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct Ratings {
    pub conceptual: f64,
    pub practical: f64,
    pub cooperation: f64,
    pub work_ethic: f64,
}

impl Ratings {
    pub fn get(&self, category: RatingCategory) -> f64 {
        match category {
            RatingCategory::Conceptual => self.conceptual,
            RatingCategory::Practical => self.practical,
            RatingCategory::Cooperation => self.cooperation,
            RatingCategory::WorkEthic => self.work_ethic,
        }
    }
}

// 互评实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct Evaluation {
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub team_id: i64,
    pub project_id: i64,
    pub status: EvaluationStatus,
    pub ratings: Option<Ratings>,
    pub comment: Option<String>,
    pub date_completed: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Evaluation {
    /// 是否允许该用户查看：评价人、被评价人或团队所属教师
    pub fn is_visible_to(&self, user_id: i64, team_instructor_id: i64) -> bool {
        self.evaluator_id == user_id
            || self.evaluatee_id == user_id
            || team_instructor_id == user_id
    }
}

/// 聚合统计的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationScope {
    /// 单个团队
    Team(i64),
    /// 该教师负责的全部团队
    Instructor(i64),
    /// 某学生收到的评价
    Evaluatee(i64),
    /// 某学生需要给出的评价
    Evaluator(i64),
}

/// 四项评分的平均值，范围内没有已完成评价时为 None
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct CategoryAverages {
    pub conceptual: Option<f64>,
    pub practical: Option<f64>,
    pub cooperation: Option<f64>,
    pub work_ethic: Option<f64>,
}

impl CategoryAverages {
    pub fn get(&self, category: RatingCategory) -> Option<f64> {
        match category {
            RatingCategory::Conceptual => self.conceptual,
            RatingCategory::Practical => self.practical,
            RatingCategory::Cooperation => self.cooperation,
            RatingCategory::WorkEthic => self.work_ethic,
        }
    }
}

/// 完成情况计数
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct CompletionCounts {
    pub completed: u64,
    pub pending: u64,
}
