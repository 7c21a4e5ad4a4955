mod announcements;
mod auth;
mod events;
mod members;
