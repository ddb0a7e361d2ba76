//! HTTP gateway in front of the Gemini generative-model API.
//!
//! Accepts text prompts and uploaded images, documents, and audio files,
//! stages uploads to transient local storage, and relays the model's
//! textual response to the caller.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;
