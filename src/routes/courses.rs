use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{CreateCourseRequest, EnrollStudentsRequest};
use crate::models::projects::requests::CreateProjectRequest;
use crate::models::users::entities::UserRole;
use crate::services::{CourseService, ProjectService};
use crate::utils::SafeCourseIdI64;

// 懒加载的全局服务实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);
static PROJECT_SERVICE: Lazy<ProjectService> = Lazy::new(ProjectService::new_lazy);

// HTTP处理程序
pub async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req).await
}

pub async fn create_course(
    req: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(&req, course_data.into_inner())
        .await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.0).await
}

pub async fn list_students(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_students(&req, course_id.0).await
}

pub async fn enroll_students(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    enroll_data: web::Json<EnrollStudentsRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .enroll_students(&req, course_id.0, enroll_data.into_inner())
        .await
}

pub async fn list_projects(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.list_projects(&req, course_id.0).await
}

pub async fn create_project(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    project_data: web::Json<CreateProjectRequest>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .create_project(&req, course_id.0, project_data.into_inner())
        .await
}

// 配置路由
pub fn configure_courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                // 教师看到所授课程，学生看到已选课程
                web::resource("").route(web::get().to(list_courses)).route(
                    web::post()
                        .to(create_course)
                        .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                ),
            )
            .service(web::resource("/{course_id}").route(web::get().to(get_course)))
            .service(
                web::resource("/{course_id}/students")
                    .route(
                        web::get()
                            .to(list_students)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    )
                    .route(
                        web::post()
                            .to(enroll_students)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            )
            .service(
                web::resource("/{course_id}/projects")
                    .route(web::get().to(list_projects))
                    .route(
                        web::post()
                            .to(create_project)
                            .wrap(middlewares::RequireRole::new_any(UserRole::instructor_roles())),
                    ),
            ),
    );
}
