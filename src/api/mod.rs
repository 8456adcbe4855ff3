pub mod attendance;
pub mod category;
pub mod company;
pub mod daily_log;
pub mod leave_request;
pub mod product;
pub mod public;
pub mod roster;
pub mod team;
pub mod user;
