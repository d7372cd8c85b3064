//! Internal modules for the Bahumati admin console.
//!
//! The binary wires a [`bahumati::SessionManager`] and
//! [`bahumati::Services`] into the [`app::App`] event loop; everything the
//! operator sees lives under [`pages`], built from the primitives in
//! [`widgets`].

pub mod app;
pub mod pages;
pub mod widgets;
