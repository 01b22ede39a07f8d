//! Embedded Lua scripting for landscapes.
//!
//! Scripts see a global `engine` table. Calls that change the world queue a
//! [`ScriptCmd`]; the game drains and applies them after the script returns.
//!
//! ```lua
//! engine.load_landscape("Data/Landscape/Land1.json")
//! engine.create_entity{ kind = "abode", x = 120, z = 340 }
//! engine.set_time_of_day(7)
//!
//! function on_update(dt)
//!     if engine.entity_count() == 0 then engine.load_map("Land 2") end
//! end
//! ```

mod commands;
mod runtime;

pub use commands::{ScriptCmd, ScriptWorldSnapshot};
pub use runtime::{ScriptVm, UPDATE_CALLBACK};
