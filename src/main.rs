mod app;
mod bolt;
mod canvas;
mod config;
mod effects;
mod input;
mod render;
mod scene;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
