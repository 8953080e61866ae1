mod alert;
mod event;
mod shared;
mod status;

pub mod dtos {
    pub use crate::alert::dtos::*;
    pub use crate::event::dtos::*;
}

pub use crate::alert::api::*;
pub use crate::event::api::*;
pub use crate::status::api::*;
