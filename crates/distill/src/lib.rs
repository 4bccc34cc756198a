//! # distill
//!
//! Turn recorded mouse and keyboard sessions into the actions a person
//! actually performed, ready for replay or for an agent prompt.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use distill::prelude::*;
//!
//! let pipeline = Pipeline::new(ReducerConfig::default())?;
//! let reduction = pipeline.reduce(vec![
//!     RawEvent::mouse_move(0.0, 10.0, 10.0),
//!     RawEvent::click(0.1, 10.0, 10.0, Button::Left, true),
//!     RawEvent::click(0.15, 10.0, 10.0, Button::Left, false),
//! ]);
//! for action in &reduction.actions {
//!     println!("{}", action);
//! }
//! # Ok::<(), distill::Error>(())
//! ```

// Re-export the data model
pub use distill_core::*;

// Re-export the reducer
pub use distill_reducer as reducer;

pub use distill_reducer::{
    Pipeline, RecordingStorage, ReduceReport, ReducedRecording, Reduction,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use distill_core::prelude::*;
    pub use distill_reducer::prelude::*;
}
