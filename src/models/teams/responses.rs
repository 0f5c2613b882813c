use serde::Serialize;
use ts_rs::TS;

use crate::models::teams::entities::{Team, TeamWithMembers};
use crate::models::users::entities::User;

/// 团队列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct TeamListResponse {
    pub items: Vec<TeamWithMembers>,
}

/// 成员变更后的团队成员列表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "team.ts")]
pub struct TeamMembersResponse {
    pub team: Team,
    pub members: Vec<User>,
}
