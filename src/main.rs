mod app;
mod config;
mod cycle;
mod grid;
mod input;
mod logging;
mod render;
mod terminal;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
