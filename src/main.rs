mod app;
mod catalog;
mod config;
mod engine;
mod mpris;
mod runtime;
mod session;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
