pub mod capture;
pub mod controller;
pub mod events;
pub mod scheduler;
pub mod state;

pub use capture::CaptureForm;
pub use controller::{ProgressSnapshot, ScanController, ScanTiming};
pub use events::{LogEventSink, ScanEvent, ScanEventSink};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use state::{ProgressState, ScanPhase};
