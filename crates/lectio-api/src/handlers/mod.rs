//! Handler modules for lectio-api.

pub mod documents;
pub mod embeds;
pub mod forum;
pub mod home;
pub mod publications;
pub mod threads;
