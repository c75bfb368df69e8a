//! # Koala Town Viewer
//!
//! This library provides the windowed viewer for the shared town. A viewer
//! joins the host under a display name, draws every avatar and turns clicks
//! into participant actions.
//!
//! ## Architecture Overview
//!
//! ### Local Copy, Host Authority
//! The viewer keeps its own [`shared::WorldState`]. Events relayed by the host
//! are applied with [`shared::reduce`] in sequence order and time is advanced
//! every frame with [`shared::advance`], so walking and chat expiry look
//! smooth between packets. Whenever the host sends a snapshot it replaces the
//! local copy outright.
//!
//! ### Actions Go Through The Host
//! Clicks and toolbar picks are never applied locally. They are sent to the
//! host, and only come back as events once the host has accepted them. Every
//! viewer, the sender included, therefore sees the same order of events.
//!
//! ## Module Organization
//!
//! - `game`: the local world copy and the sequence bookkeeping
//! - `input`: mouse and keyboard handling, click-to-target mapping
//! - `network`: the UDP connection and the per-frame client loop
//! - `rendering`: scene, avatars, name labels, chat bubbles and the toolbar
//! - `toolbar`: category buttons and their menus, without any drawing
//!
//! ## Controls
//!
//! - Left click in the scene: walk there
//! - Toolbar: pick a chat phrase or a dance
//! - Keys 1-5: dance shortcuts
//! - Escape: close an open menu

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod toolbar;
