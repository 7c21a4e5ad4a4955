pub mod admin;
pub mod announcement;
pub mod event;
pub mod file_chunk;
pub mod file_record;
pub mod member;
