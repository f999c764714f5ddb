/// Database models for TaskNest
///
/// Each model owns its CRUD queries. Anything owned by a user (tasks,
/// categories) exposes lookups that filter by `id AND owner_id` in a single
/// query; ownership is enforced inside the SQL, never as a separate
/// fetch-then-compare step, so a row that exists but belongs to someone else
/// is indistinguishable from one that does not exist.
///
/// # Models
///
/// - `user`: accounts (password and/or GitHub credential)
/// - `category`: per-user task categories, name unique per owner
/// - `task`: the tasks themselves
/// - `comment`: comments attached to a task
pub mod category;
pub mod comment;
pub mod task;
pub mod user;
