pub mod bootstrap;
pub mod clean;
pub mod run;
pub mod status;
