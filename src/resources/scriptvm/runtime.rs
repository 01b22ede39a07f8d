//! Lua state and the `engine` table API.

use std::cell::RefCell;
use std::path::Path;

use log::{debug, error, info, warn};
use mlua::prelude::*;
use raylib::prelude::Vector3;

use super::commands::{ScriptCmd, ScriptWorldSnapshot};
use crate::error::ScriptError;
use crate::resources::entityregistry::EntitySpawn;

/// Name of the optional per-frame callback a script may define.
pub const UPDATE_CALLBACK: &str = "on_update";

/// Shared state reachable from Lua closures through `app_data`.
struct ScriptAppData {
    commands: RefCell<Vec<ScriptCmd>>,
    snapshot: RefCell<ScriptWorldSnapshot>,
}

/// Registers a Lua function that pushes a command onto the queue.
macro_rules! register_cmd {
    ($engine:expr, $lua:expr, $name:expr, |$args:pat_param| $arg_ty:ty, $cmd:expr) => {
        $engine.set(
            $name,
            $lua.create_function(|lua, $args: $arg_ty| {
                push_command(lua, $cmd)?;
                Ok(())
            })?,
        )?;
    };
}

fn push_command(lua: &Lua, cmd: ScriptCmd) -> LuaResult<()> {
    lua.app_data_ref::<ScriptAppData>()
        .ok_or_else(|| LuaError::runtime("ScriptAppData not found"))?
        .commands
        .borrow_mut()
        .push(cmd);
    Ok(())
}

/// One Lua interpreter. Each loaded map gets its own.
///
/// The state is `!Send`; it lives on the loop thread with the rest of the
/// game.
pub struct ScriptVm {
    lua: Lua,
}

impl ScriptVm {
    /// Creates a VM with the `engine` table registered.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();
        lua.set_app_data(ScriptAppData {
            commands: RefCell::new(Vec::new()),
            snapshot: RefCell::new(ScriptWorldSnapshot::default()),
        });

        let vm = Self { lua };
        vm.register_log_api()?;
        vm.register_world_api()?;
        vm.register_query_api()?;
        Ok(vm)
    }

    /// Creates a VM whose `require` looks in `dir` first.
    pub fn with_search_path(dir: &Path) -> LuaResult<Self> {
        let vm = Self::new()?;
        let root = dir.to_string_lossy().replace('\\', "/");
        let package: LuaTable = vm.lua.globals().get("package")?;
        let path: String = package.get("path")?;
        package.set("path", format!("{root}/?.lua;{root}/?/init.lua;{path}"))?;
        Ok(vm)
    }

    fn register_log_api(&self) -> LuaResult<()> {
        let engine = self.lua.create_table()?;

        // engine.log(message)
        engine.set(
            "log",
            self.lua.create_function(|_, msg: String| {
                info!(target: "script", "{}", msg);
                Ok(())
            })?,
        )?;
        engine.set(
            "log_info",
            self.lua.create_function(|_, msg: String| {
                info!(target: "script", "{}", msg);
                Ok(())
            })?,
        )?;
        engine.set(
            "log_warn",
            self.lua.create_function(|_, msg: String| {
                warn!(target: "script", "{}", msg);
                Ok(())
            })?,
        )?;
        engine.set(
            "log_error",
            self.lua.create_function(|_, msg: String| {
                error!(target: "script", "{}", msg);
                Ok(())
            })?,
        )?;

        self.lua.globals().set("engine", engine)?;
        Ok(())
    }

    fn register_world_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        register_cmd!(engine, self.lua, "load_landscape",
            |path| String, ScriptCmd::LoadLandscape { path });
        register_cmd!(engine, self.lua, "set_camera",
            |(px, py, pz, tx, ty, tz)| (f32, f32, f32, f32, f32, f32),
            ScriptCmd::SetCamera {
                position: Vector3::new(px, py, pz),
                target: Vector3::new(tx, ty, tz),
            });
        register_cmd!(engine, self.lua, "set_time_of_day",
            |hour| f32, ScriptCmd::SetTimeOfDay { hour });
        register_cmd!(engine, self.lua, "load_map",
            |name| String, ScriptCmd::LoadMap { name });
        register_cmd!(engine, self.lua, "quit", |()| (), ScriptCmd::Quit);

        // engine.create_entity{ kind = "villager", x = 10, z = 20, ... }
        engine.set(
            "create_entity",
            self.lua.create_function(|lua, spec: LuaTable| {
                let spawn: EntitySpawn = lua.from_value(LuaValue::Table(spec))?;
                push_command(lua, ScriptCmd::CreateEntity(spawn))
            })?,
        )?;
        Ok(())
    }

    fn register_query_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        engine.set(
            "time_of_day",
            self.lua
                .create_function(|lua, ()| snapshot_field(lua, |s| s.time_of_day))?,
        )?;
        engine.set(
            "entity_count",
            self.lua
                .create_function(|lua, ()| snapshot_field(lua, |s| s.entity_count))?,
        )?;
        engine.set(
            "active_map",
            self.lua
                .create_function(|lua, ()| snapshot_field(lua, |s| s.active_map.clone()))?,
        )?;
        // engine.cursor_position() -> { x, y, z } or nil
        engine.set(
            "cursor_position",
            self.lua.create_function(|lua, ()| {
                match snapshot_field(lua, |s| s.cursor)? {
                    Some([x, y, z]) => {
                        let t = lua.create_table()?;
                        t.set("x", x)?;
                        t.set("y", y)?;
                        t.set("z", z)?;
                        Ok(LuaValue::Table(t))
                    }
                    None => Ok(LuaValue::Nil),
                }
            })?,
        )?;
        Ok(())
    }

    /// Runs a chunk of Lua source. `name` shows up in error messages.
    pub fn exec(&self, source: &str, name: &str) -> Result<(), ScriptError> {
        self.lua.load(source).set_name(name).exec()?;
        Ok(())
    }

    /// Calls `on_update(dt)` when the script defines it.
    pub fn step(&self, dt: f32) -> Result<(), ScriptError> {
        if self.has_function(UPDATE_CALLBACK) {
            self.call_function::<_, ()>(UPDATE_CALLBACK, dt)?;
        }
        Ok(())
    }

    /// Takes every command queued since the last drain.
    pub fn drain_commands(&self) -> Vec<ScriptCmd> {
        self.lua
            .app_data_ref::<ScriptAppData>()
            .map(|data| data.commands.borrow_mut().drain(..).collect())
            .unwrap_or_default()
    }

    /// Replaces the state returned by the `engine` query functions.
    pub fn set_snapshot(&self, snapshot: ScriptWorldSnapshot) {
        match self.lua.app_data_ref::<ScriptAppData>() {
            Some(data) => *data.snapshot.borrow_mut() = snapshot,
            None => debug!("Script snapshot dropped: no app data"),
        }
    }

    pub fn call_function<A, R>(&self, name: &str, args: A) -> LuaResult<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        func.call(args)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.lua.globals().get::<LuaFunction>(name).is_ok()
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

fn snapshot_field<T>(lua: &Lua, f: impl FnOnce(&ScriptWorldSnapshot) -> T) -> LuaResult<T> {
    let data = lua
        .app_data_ref::<ScriptAppData>()
        .ok_or_else(|| LuaError::runtime("ScriptAppData not found"))?;
    let snapshot = data.snapshot.borrow();
    Ok(f(&snapshot))
}
