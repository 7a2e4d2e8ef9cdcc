/// Domain models
///
/// - `user`: Registered accounts
/// - `task`: Owner-scoped todo items, their inputs and validation rules

pub mod task;
pub mod user;
