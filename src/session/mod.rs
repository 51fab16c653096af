pub mod errors;
pub mod handoff;
pub mod store;
pub mod validation;

pub use errors::{AccountError, Field, FieldError};
pub use handoff::ResultSlot;
pub use store::{Session, SessionStore, DEMO_DISPLAY_NAME, DEMO_EMAIL, DEMO_PASSWORD};
pub use validation::Registration;
