//! distill-core - Data model for reducing recorded input sessions
//!
//! Raw device events go in, action events come out. This crate holds the
//! types both sides share; the reducer stages live in `distill-reducer`.

pub mod action;
pub mod config;
pub mod error;
pub mod events;

pub use action::{flatten_log, wrap_raw, ActionEvent, ActionKind, Child, SideChannelRefs, Stage};
pub use config::{MoveMergeMode, ReducerConfig};
pub use error::{Error, ErrorCode, Result};
pub use events::{Button, InputData, Key, RawEvent, Recording, Screenshot, WindowEvent};

pub mod prelude {
    pub use crate::action::{flatten_log, ActionEvent, ActionKind, Child, Stage};
    pub use crate::config::{MoveMergeMode, ReducerConfig};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::events::{Button, InputData, Key, RawEvent, Recording, Screenshot, WindowEvent};
}
