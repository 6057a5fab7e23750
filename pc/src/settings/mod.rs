//! Execution settings
//!
//! Model-call parameters attached to a prompt template. A settings bag binds
//! the keys its [`SettingsShape`] recognizes to typed fields and keeps every
//! other key verbatim in `extension_data`.
//!
//! ```ignore
//! let bag = ExecutionSettings::<RequestSettings>::from_map(&source)?;
//! assert_eq!(bag.temperature, 0.5);
//! assert_eq!(bag.extension_data["chat_system_prompt"], "Be brief.");
//! ```

mod bag;
mod request;
mod shape;

pub use bag::ExecutionSettings;
pub(crate) use bag::kind_of;
pub use request::RequestSettings;
pub use shape::{SettingsShape, UntypedSettings, bind_fields};
