//! Event layer: typed input records and the validator that produces them.
//!
//! Raw records arrive as untyped JSON. `validate` is the only way to obtain an
//! `InputEvent`; everything downstream works on the closed enum.

pub mod record;
pub mod validate;

pub use record::{Command, ControlEvent, InputEvent, SampleEvent};
pub use validate::{ValidationError, validate};
