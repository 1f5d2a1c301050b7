//! Inbound adapters that turn terminal input into domain flow calls.
//!
//! Routing and owner gating live under [`navigation`], the shared form
//! machinery under [`forms`], and the `lunch` command surface under [`cli`].
//! [`render`] turns view models into text.

pub mod cli;
pub mod forms;
pub mod navigation;
pub mod render;
