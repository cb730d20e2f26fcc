pub mod configure;
pub mod logger;
pub mod message_codec;
pub mod models;
pub mod sender;
