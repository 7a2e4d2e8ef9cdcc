/// Application services
///
/// Services sit between the HTTP layer and storage. They validate input,
/// enforce owner scoping and translate storage failures into their own error
/// enums; only the API crate turns those into status codes.
///
/// - `tasks`: [`tasks::TaskService`], owner-scoped task operations
/// - `users`: [`users::UserDirectory`], registration and credential checks

pub mod tasks;
pub mod users;
