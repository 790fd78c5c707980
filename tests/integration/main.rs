//! Integration tests with mock HTTP server

mod mock_server;

mod agent;
mod chat;
mod media;
mod recipes;
mod streaming;
