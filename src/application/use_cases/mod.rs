pub mod account;
pub mod admin_guard;
pub mod invitation;
pub mod user;
