//! Client library for the group lunch voting service.
//!
//! The crate is laid out hexagonally: [`domain`] holds validated values,
//! ports, and one service per flow; [`outbound`] adapts the ports to the
//! HTTP backend and the local state file; [`inbound`] routes terminal
//! requests through the flows; [`config`] loads `LUNCH_*` settings.
//!
//! ```
//! use lunch_client::inbound::navigation::Route;
//!
//! let route = Route::parse("/view-sessions").expect("known path");
//! assert_eq!(route, Route::ViewSessions);
//! ```

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
