mod common;
mod messages;
