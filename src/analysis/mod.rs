pub mod flow;
pub mod health;
pub mod projection;
pub mod summary;
