//! # netmap CLI
//!
//! Command-line surface for the topology editor.
//!
//! Every invocation reloads the canvas from the store, runs the requested
//! intents, then prints the notices they raised.
//!
//! ## Commands
//!
//! - `show` - Print the canvas
//! - `add-device` / `add-group` - Add a node
//! - `connect` / `disconnect` - Draw or remove a connection
//! - `edit-device` / `edit-group` - Change a node's data
//! - `delete` - Delete a device or group
//! - `map` / `mappings` - Record and list device-group membership
//! - `replay` - Run a JSON-lines script of intents
//!

pub mod render;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use netmap_canvas::{EditSession, Intent, NetworkEditor, Outcome};
use netmap_core::DeviceType;
use netmap_gateway::{MemoryStore, RemoteStore, RestStore, StoreConfig};
use netmap_model::{DeviceData, ElementId, GroupData, NodeData};
use std::path::PathBuf;
use tracing::{debug, info};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// netmap - home network topology editor
#[derive(Parser, Debug)]
#[command(name = "netmap", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the topology is stored
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// TOML file with store settings
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store project URL
    #[arg(long, global = true, env = "NETMAP_STORE_URL", hide_env_values = true)]
    pub store_url: Option<String>,

    /// Store API key
    #[arg(long, global = true, env = "NETMAP_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use an in-process store that lives for this run only
    #[arg(long, global = true)]
    pub memory: bool,
}

impl StoreArgs {
    /// File and environment settings with flags applied on top
    pub fn resolve(&self) -> anyhow::Result<StoreConfig> {
        let mut config = StoreConfig::load(self.config.as_deref())?;
        if let Some(url) = &self.store_url {
            config.url = url.clone();
        }
        if let Some(key) = &self.store_key {
            config.api_key = key.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the canvas
    Show,

    /// Add a device
    AddDevice {
        name: String,
        ip_address: String,
        /// computer, server, router, network, database, wifi or cable
        #[arg(short = 't', long = "type", default_value = "computer")]
        device_type: DeviceType,
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Add a device group
    AddGroup {
        name: String,
        /// Color token or CSS color
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Connect two devices
    Connect { source: ElementId, target: ElementId },

    /// Change a device's fields
    EditDevice {
        id: ElementId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ip_address: Option<String>,
        #[arg(short = 't', long = "type")]
        device_type: Option<DeviceType>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Change a group's fields
    EditGroup {
        id: ElementId,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a device (with its connections) or a group
    Delete { id: ElementId },

    /// Delete a connection
    Disconnect { edge: ElementId },

    /// Put a device in a group
    Map { device: ElementId, group: ElementId },

    /// List device-group mappings
    Mappings,

    /// Run a JSON-lines file of intents
    Replay { file: PathBuf },
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.store.memory {
        info!("Using in-memory store");
        return run_with(NetworkEditor::new(MemoryStore::new()), cli.command).await;
    }

    let config = cli.store.resolve()?;
    let store = RestStore::new(&config).context("Could not set up the store client")?;
    info!("Using store at {}", store.base_url());
    run_with(NetworkEditor::new(store), cli.command).await
}

async fn run_with<S: RemoteStore>(
    mut editor: NetworkEditor<S>,
    command: Command,
) -> anyhow::Result<()> {
    let reloaded = editor.dispatch(Intent::Reload).await;
    // Only the reload notice matters when it failed.
    if let Err(e) = reloaded {
        flush_notices(&editor);
        return Err(e.into());
    }
    editor.notices().drain();

    let result = execute(&mut editor, command).await;
    flush_notices(&editor);
    result
}

async fn execute<S: RemoteStore>(
    editor: &mut NetworkEditor<S>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Show => {}
        Command::Mappings => {
            let mappings = editor.sync().device_group_mappings().await;
            print!("{}", render::format_mappings(&editor.snapshot(), &mappings));
            return Ok(());
        }
        Command::Replay { file } => {
            let script = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let intents = Intent::parse_lines(&script)?;
            debug!("Replaying {} intent(s) from {}", intents.len(), file.display());
            editor.replay(intents).await?;
        }
        edit_command @ (Command::EditDevice { .. } | Command::EditGroup { .. }) => {
            edit(editor, edit_command).await?;
        }
        other => {
            let intent = into_intent(other).context("Command has no direct intent")?;
            match editor.dispatch(intent).await? {
                Outcome::Created(id) => println!("{}", id),
                Outcome::Mapped(Some(row)) => println!("{}", row),
                _ => {}
            }
            return Ok(());
        }
    }
    print!("{}", render::format_canvas(&editor.snapshot()));
    Ok(())
}

/// Commands that map onto a single intent
fn into_intent(command: Command) -> Option<Intent> {
    let intent = match command {
        Command::AddDevice {
            name,
            ip_address,
            device_type,
            notes,
        } => Intent::AddDevice {
            device: DeviceData::new(name, ip_address, device_type).with_notes(notes),
        },
        Command::AddGroup { name, color } => {
            let group = GroupData::new(name);
            Intent::AddGroup {
                group: match color {
                    Some(color) => group.with_color(color),
                    None => group,
                },
            }
        }
        Command::Connect { source, target } => Intent::Connect { source, target },
        Command::Delete { id } => Intent::DeleteEntity { node: id },
        Command::Disconnect { edge } => Intent::DeleteConnection { edge },
        Command::Map { device, group } => Intent::MapDeviceToGroup { device, group },
        _ => return None,
    };
    Some(intent)
}

/// Open the node's editor, merge the given fields over its data, save
async fn edit<S: RemoteStore>(
    editor: &mut NetworkEditor<S>,
    command: Command,
) -> anyhow::Result<()> {
    let node = match &command {
        Command::EditDevice { id, .. } | Command::EditGroup { id, .. } => id.clone(),
        _ => bail!("not an edit command"),
    };
    let is_device_edit = matches!(command, Command::EditDevice { .. });
    let session = match editor.dispatch(Intent::OpenEdit { node }).await? {
        Outcome::Session(session) => session,
        other => bail!("unexpected outcome {:?}", other),
    };

    let edit = match (session, command) {
        (
            EditSession::EditingDevice { mut data, .. },
            Command::EditDevice {
                name,
                ip_address,
                device_type,
                notes,
                ..
            },
        ) => {
            if let Some(name) = name {
                data.name = name;
            }
            if let Some(ip) = ip_address {
                data.ip_address = ip;
            }
            if let Some(device_type) = device_type {
                data.device_type = device_type;
            }
            if let Some(notes) = notes {
                data.notes = notes;
            }
            NodeData::Device(data)
        }
        (EditSession::EditingGroup { mut data, .. }, Command::EditGroup { name, color, .. }) => {
            if let Some(name) = name {
                data.name = name;
            }
            if let Some(color) = color {
                data.color = color;
            }
            NodeData::Group(data)
        }
        (session, _) => {
            editor.dispatch(Intent::CancelEdit).await?;
            bail!(
                "{} is not a {}",
                session.node_id().map(ElementId::to_string).unwrap_or_default(),
                if is_device_edit { "device" } else { "group" }
            );
        }
    };

    if let Err(e) = editor.dispatch(Intent::SaveEdit { edit }).await {
        editor.dispatch(Intent::CancelEdit).await?;
        return Err(e.into());
    }
    Ok(())
}

fn flush_notices<S: RemoteStore>(editor: &NetworkEditor<S>) {
    print!("{}", render::format_notices(&editor.notices().drain()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("netmap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_add_device() {
        let cli = parse(&["--memory", "add-device", "NAS", "192.168.1.50", "-t", "server"]);
        assert!(cli.store.memory);
        let intent = into_intent(cli.command).unwrap();
        assert_eq!(
            intent,
            Intent::AddDevice {
                device: DeviceData::new("NAS", "192.168.1.50", DeviceType::Server)
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_ids_and_types() {
        let bad_id = Cli::try_parse_from(["netmap", "delete", "42"]);
        assert!(bad_id.is_err());
        let bad_type = Cli::try_parse_from(["netmap", "add-device", "x", "1.1.1.1", "-t", "toaster"]);
        assert!(bad_type.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["show", "--memory", "--verbose"]);
        assert!(cli.store.memory);
        assert!(cli.verbose);
    }

    #[test]
    fn test_store_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = \"https://file.example.co\"\napi_key = \"file-key\"").unwrap();

        let args = StoreArgs {
            config: Some(file.path().to_path_buf()),
            store_url: Some("https://flag.example.co".to_string()),
            timeout: Some(30),
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.url, "https://flag.example.co");
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_edit_merges_fields() {
        let mut editor = NetworkEditor::new(MemoryStore::new());
        let id = match editor
            .dispatch(Intent::AddDevice {
                device: DeviceData::new("NAS", "192.168.1.50", DeviceType::Server)
                    .with_notes("backups"),
            })
            .await
            .unwrap()
        {
            Outcome::Created(id) => id,
            other => panic!("unexpected {:?}", other),
        };

        let cli = parse(&["edit-device", id.as_str(), "--ip-address", "192.168.1.60"]);
        edit(&mut editor, cli.command).await.unwrap();

        let node = editor.snapshot().node(&id).unwrap().clone();
        assert_eq!(
            node.data,
            NodeData::Device(
                DeviceData::new("NAS", "192.168.1.60", DeviceType::Server).with_notes("backups")
            )
        );
        assert!(!editor.session().is_open());
    }

    #[tokio::test]
    async fn test_replay_command_runs_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{}",
            r#"{"intent":"add-group","group":{"name":"Office"}}"#
        )
        .unwrap();

        let mut editor = NetworkEditor::new(MemoryStore::new());
        execute(
            &mut editor,
            Command::Replay {
                file: file.path().to_path_buf(),
            },
        )
        .await
        .unwrap();
        assert_eq!(editor.snapshot().node_count(), 1);
    }
}
