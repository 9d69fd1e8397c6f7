//! Configuration section definitions.
//!
//! Each module corresponds to a section in `maplive.toml`:
//!
//! | Module     | TOML Section   | Purpose                              |
//! |------------|----------------|--------------------------------------|
//! | `server`   | `[server]`     | Remote mapping server endpoint       |
//! | `pipeline` | `[pipeline]`   | Debounce timing                      |
//! | `output`   | `[output]`     | Files mirroring the live results     |

mod output;
mod pipeline;
mod server;

pub use output::OutputConfig;
pub use pipeline::PipelineConfig;
pub use server::ServerConfig;
