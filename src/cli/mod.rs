//! Terminal commands beyond `serve`.

pub mod ask;
pub mod doctor;

pub use ask::ask;
pub use doctor::doctor;
