//! 预导入模块，方便使用

pub use super::course_enrollments::{
    ActiveModel as CourseEnrollmentActiveModel, Entity as CourseEnrollments,
    Model as CourseEnrollmentModel,
};
pub use super::courses::{
    ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel,
};
pub use super::evaluations::{
    ActiveModel as EvaluationActiveModel, Entity as Evaluations, Model as EvaluationModel,
};
pub use super::projects::{
    ActiveModel as ProjectActiveModel, Entity as Projects, Model as ProjectModel,
};
pub use super::teams::{ActiveModel as TeamActiveModel, Entity as Teams, Model as TeamModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
