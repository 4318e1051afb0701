pub mod music;
pub mod user;
