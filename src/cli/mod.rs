//! Command-line interface for Window Templates
//!
//! Manages the preset file and applies presets to the current desktop.

use crate::config::PresetStore;
use crate::macos::display::DisplayProvider;
use crate::macos::permissions::{open_accessibility_settings, PermissionProvider};
use crate::models::{NormalizedRect, Preset, Target};
use crate::services::LayoutOrchestrator;
use crate::{Result, WindowTemplatesError};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Window Templates command-line interface
#[derive(Parser, Debug)]
#[command(name = "window-templates")]
#[command(about = "Save and restore multi-application window layouts on macOS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct WindowTemplatesCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Presets file path, overrides the configured location
    #[arg(short, long, global = true)]
    pub presets: Option<PathBuf>,

    /// Enable JSON output for machine-readable results
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List saved presets
    List,

    /// Show a preset's targets and where they would land on the current display
    Show {
        /// Preset name or ID
        preset: String,
    },

    /// Apply a preset
    Apply {
        /// Preset name or ID
        preset: String,
    },

    /// Create an empty preset
    New {
        /// Preset name
        #[arg(default_value = Preset::DEFAULT_NAME)]
        name: String,
    },

    /// Delete a preset
    Delete {
        /// Preset name or ID
        preset: String,
    },

    /// Add an application window slot to a preset
    AddTarget(AddTargetArgs),

    /// Accessibility permission commands
    Permissions(PermissionCommands),
}

#[derive(Args, Debug)]
pub struct AddTargetArgs {
    /// Preset name or ID
    pub preset: String,

    /// Bundle identifier of the application, e.g. com.apple.Safari
    pub bundle_id: String,

    /// Normalized rectangle as x,y,width,height in [0, 1]
    #[arg(long, value_parser = parse_rect, conflicts_with = "grid", required_unless_present = "grid")]
    pub rect: Option<NormalizedRect>,

    /// Grid cell as columns,rows,column,row (zero-based)
    #[arg(long, value_parser = parse_grid)]
    pub grid: Option<GridCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub columns: u32,
    pub rows: u32,
    pub column: u32,
    pub row: u32,
}

#[derive(Args, Debug)]
pub struct PermissionCommands {
    #[command(subcommand)]
    pub action: PermissionActions,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum PermissionActions {
    /// Report whether accessibility access is granted
    Check,
    /// Ask the system to prompt for accessibility access
    Request,
    /// Open the Accessibility pane of System Settings
    OpenSettings,
}

fn parse_numbers<T: std::str::FromStr>(value: &str, expected: usize) -> std::result::Result<Vec<T>, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid number in '{value}'"))?;

    if parts.len() != expected {
        return Err(format!("expected {expected} comma-separated values, got {}", parts.len()));
    }
    Ok(parts)
}

fn parse_rect(value: &str) -> std::result::Result<NormalizedRect, String> {
    let parts = parse_numbers::<f64>(value, 4)?;
    if parts.iter().any(|part| !part.is_finite()) {
        return Err(format!("rectangle values must be finite: '{value}'"));
    }
    Ok(NormalizedRect::new(parts[0], parts[1], parts[2], parts[3]))
}

fn parse_grid(value: &str) -> std::result::Result<GridCell, String> {
    let parts = parse_numbers::<u32>(value, 4)?;
    let cell = GridCell {
        columns: parts[0],
        rows: parts[1],
        column: parts[2],
        row: parts[3],
    };
    if cell.columns == 0 || cell.rows == 0 {
        return Err("grid must have at least one column and one row".to_string());
    }
    if cell.column >= cell.columns || cell.row >= cell.rows {
        return Err(format!(
            "cell ({}, {}) is outside a {}x{} grid",
            cell.column, cell.row, cell.columns, cell.rows
        ));
    }
    Ok(cell)
}

impl AddTargetArgs {
    fn normalized_rect(&self) -> Result<NormalizedRect> {
        match (self.rect, self.grid) {
            (Some(rect), _) => Ok(rect),
            (None, Some(cell)) => Ok(NormalizedRect::grid_cell(
                cell.columns,
                cell.rows,
                cell.column,
                cell.row,
            )),
            (None, None) => Err(WindowTemplatesError::ConfigurationError(
                "either --rect or --grid is required".to_string(),
            )
            .into()),
        }
    }
}

/// CLI command executor
pub struct WindowTemplatesCliExecutor {
    store: PresetStore,
    orchestrator: LayoutOrchestrator,
    permissions: Arc<dyn PermissionProvider>,
    displays: Arc<dyn DisplayProvider>,
    json_output: bool,
}

impl WindowTemplatesCliExecutor {
    pub fn new(
        store: PresetStore,
        orchestrator: LayoutOrchestrator,
        permissions: Arc<dyn PermissionProvider>,
        displays: Arc<dyn DisplayProvider>,
        json_output: bool,
    ) -> Self {
        Self {
            store,
            orchestrator,
            permissions,
            displays,
            json_output,
        }
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::List => self.list(),
            Commands::Show { preset } => self.show(&preset),
            Commands::Apply { preset } => self.apply(&preset).await,
            Commands::New { name } => self.create(name),
            Commands::Delete { preset } => self.delete(&preset),
            Commands::AddTarget(args) => self.add_target(args),
            Commands::Permissions(cmd) => self.execute_permission_command(cmd.action),
        }
    }

    fn find(&self, query: &str) -> Result<&Preset> {
        self.store
            .find(query)
            .ok_or_else(|| WindowTemplatesError::PresetNotFound(query.to_string()).into())
    }

    fn list(&self) -> Result<()> {
        let presets = self.store.presets();

        if self.json_output {
            println!("{}", serde_json::to_string_pretty(presets)?);
        } else if presets.is_empty() {
            println!("No presets found in {}", self.store.path().display());
        } else {
            println!("Presets:");
            for preset in presets {
                println!(
                    "  {} - {} ({} targets, {} applications)",
                    preset.id,
                    preset.name,
                    preset.targets.len(),
                    preset.applications().len()
                );
            }
        }
        Ok(())
    }

    fn show(&self, query: &str) -> Result<()> {
        let preset = self.find(query)?;
        let area = match self.displays.active_display_usable_area() {
            Ok(area) => Some(area),
            Err(err) => {
                warn!("Cannot resolve pixel geometry: {:#}", err);
                None
            }
        };

        if self.json_output {
            let targets: Vec<_> = preset
                .targets
                .iter()
                .map(|target| {
                    serde_json::json!({
                        "id": target.id,
                        "appBundleID": target.app_bundle_id,
                        "rect": target.rect,
                        "frame": area.map(|area| target.rect.to_pixel_rect(&area)),
                    })
                })
                .collect();
            let json = serde_json::json!({
                "id": preset.id,
                "name": preset.name,
                "area": area,
                "targets": targets,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        println!("{} ({})", preset.name, preset.id);
        if let Some(area) = area {
            println!(
                "  Display area: {}x{} at ({}, {})",
                area.width, area.height, area.x, area.y
            );
        }
        for group in preset.groups() {
            println!("  {}", group.app_bundle_id);
            for target in group.targets {
                let rect = target.rect;
                print!(
                    "    [{:.3}, {:.3}, {:.3}, {:.3}]",
                    rect.x, rect.y, rect.width, rect.height
                );
                match area {
                    Some(area) => println!(" -> {}", rect.to_pixel_rect(&area)),
                    None => println!(),
                }
            }
        }
        Ok(())
    }

    async fn apply(&self, query: &str) -> Result<()> {
        let preset = self.find(query)?;
        info!("Applying preset '{}'", preset.name);

        let report = self.orchestrator.apply(preset).await?;
        if self.json_output {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{report}");
        }
        Ok(())
    }

    fn create(&mut self, name: String) -> Result<()> {
        let id = self.store.add(Preset::new(name, Vec::new()));
        self.store.save()?;

        info!("Created preset {}", id);
        if self.json_output {
            println!("{}", serde_json::json!({ "id": id }));
        } else {
            println!("Created preset {}", id);
        }
        Ok(())
    }

    fn delete(&mut self, query: &str) -> Result<()> {
        let id = self.find(query)?.id;
        if let Some(removed) = self.store.remove(id) {
            self.store.save()?;
            info!("Deleted preset '{}'", removed.name);
            if !self.json_output {
                println!("Deleted preset '{}'", removed.name);
            }
        }
        Ok(())
    }

    fn add_target(&mut self, args: AddTargetArgs) -> Result<()> {
        let rect = args.normalized_rect()?.clamped();
        let mut preset = self.find(&args.preset)?.clone();

        let target = Target::new(args.bundle_id, rect);
        let target_id = target.id;
        preset.targets.push(target);
        self.store.upsert(preset);
        self.store.save()?;

        if self.json_output {
            println!("{}", serde_json::json!({ "id": target_id }));
        } else {
            println!("Added target {}", target_id);
        }
        Ok(())
    }

    fn execute_permission_command(&self, action: PermissionActions) -> Result<()> {
        match action {
            PermissionActions::Check => {
                let granted = self.permissions.is_trusted();
                if self.json_output {
                    println!("{}", serde_json::json!({ "accessibility": granted }));
                } else if granted {
                    println!("Accessibility access: granted");
                } else {
                    println!("Accessibility access: not granted");
                    println!("Run `window-templates permissions request` to be prompted.");
                }
            }
            PermissionActions::Request => {
                if self.permissions.is_trusted() {
                    println!("Accessibility access is already granted");
                } else {
                    self.permissions.request_access();
                    println!("Requested accessibility access; approve it in System Settings and re-run.");
                }
            }
            PermissionActions::OpenSettings => {
                open_accessibility_settings()?;
            }
        }
        Ok(())
    }
}
