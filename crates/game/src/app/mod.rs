mod audio;
mod bootstrap;
mod gameplay;
mod loop_runner;
mod scores;
mod session;
mod settings;
mod view;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
