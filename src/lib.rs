//! uigen: turn model-written component code into a safe, literal-only
//! preview tree, and serve it behind a chat API.

pub mod config;
pub mod error;
pub mod llm;
pub mod markup;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
