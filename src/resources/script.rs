//! Script front-end: runs landscape scripts read through the [`FileSystem`].

use log::info;

use crate::error::ScriptError;
use crate::resources::filesystem::FileSystem;
use crate::resources::scriptvm::{ScriptCmd, ScriptVm};

/// Result of running a landscape script: the VM it ran in and everything it
/// asked for.
pub struct ScriptRun {
    pub vm: ScriptVm,
    pub commands: Vec<ScriptCmd>,
    pub path: String,
}

impl ScriptRun {
    /// Landscape file named by the last `engine.load_landscape` call.
    pub fn landscape_path(&self) -> Option<&str> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            ScriptCmd::LoadLandscape { path } => Some(path.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
pub struct Script {
    scripts_run: usize,
    last_path: Option<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the script at `path` in a fresh VM.
    pub fn run_script(&mut self, fs: &FileSystem, path: &str) -> Result<ScriptRun, ScriptError> {
        let source = fs.read_to_string(path)?;
        let search_path = fs
            .find_path(path)
            .and_then(|p| p.parent().map(|dir| dir.to_path_buf()))
            .unwrap_or_else(|| fs.game_path().to_path_buf());

        let vm = ScriptVm::with_search_path(&search_path)?;
        vm.exec(&source, path)?;
        let commands = vm.drain_commands();

        self.scripts_run += 1;
        self.last_path = Some(path.to_string());
        info!("Ran script {} ({} commands)", path, commands.len());

        Ok(ScriptRun {
            vm,
            commands,
            path: path.to_string(),
        })
    }

    pub fn scripts_run(&self) -> usize {
        self.scripts_run
    }

    pub fn last_path(&self) -> Option<&str> {
        self.last_path.as_deref()
    }
}
