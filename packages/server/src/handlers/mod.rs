pub mod announcements;
pub mod auth;
pub mod events;
pub mod files;
pub mod integrity;
pub mod members;
