// src/linkedin/mod.rs
pub mod chrome;
pub mod driver;
pub mod extract;
pub mod serialize;
pub mod session;

pub use chrome::ChromeBrowser;
pub use driver::{BrowserDriver, DriverError};
pub use extract::{FieldError, Section};
pub use serialize::{Record, ToRecord};
pub use session::ProfileSession;
