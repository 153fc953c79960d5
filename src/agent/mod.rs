//! Agent core: protocol, transcript, prompt, turn loop and session.

pub mod history;
pub mod prompt;
pub mod protocol;
pub mod session;
pub mod turn;

pub use history::{History, Message, Role};
pub use protocol::{Step, StepKind, parse_step, step_schema};
pub use session::{ConsoleObserver, Session};
pub use turn::{
    SilentObserver, StepObserver, TurnOutcome, TurnParams, TurnRunner, TurnStopReason,
};
