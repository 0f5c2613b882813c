pub mod auth;

pub mod courses;

pub mod dashboard;

pub mod evaluations;

pub mod projects;

pub mod teams;

pub use auth::configure_auth_routes;
pub use courses::configure_courses_routes;
pub use dashboard::configure_dashboard_routes;
pub use evaluations::configure_evaluations_routes;
pub use projects::configure_projects_routes;
pub use teams::configure_teams_routes;
