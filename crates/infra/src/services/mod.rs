pub mod knock;
