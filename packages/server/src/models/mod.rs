pub mod announcement;
pub mod auth;
pub mod event;
pub mod member;
pub mod shared;
