pub mod db_utils;
pub mod user_cache;
pub mod username_filter;
