#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_api_server;

pub use mock_api_server::{MockApiServer, MockReply, RecordedRequest};
