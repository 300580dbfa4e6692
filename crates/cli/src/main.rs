// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wardctl`: thin RPC client for the `wardd` control-plane socket. Parses
//! arguments, builds one [`ward_wire::Request`] or [`ward_wire::Query`],
//! sends it, prints the response. Exit codes: 0 success, 1 config error,
//! 2 apply failure, 3 validation failure, ≥64 reserved for subsystem
//! specifics.

mod client;
mod color;
mod env;
mod exit_error;
mod output;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use output::OutputFormat;
use ward_core::{Bond, Interface, Vlan};
use ward_wire::{Query, Request, Response};

#[derive(Parser)]
#[command(name = "wardctl", version, styles = color::styles())]
struct Cli {
    /// Override the control socket path (`WARD_SOCKET_PATH` env var otherwise).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start `wardd` via the system service manager.
    Start,
    /// Trigger a config reload (`SIGHUP`) on the running daemon.
    Reload,
    /// Commit the staged configuration.
    Apply,
    /// Discard the staged configuration.
    Discard,
    /// Parse and validate a config file locally, without contacting `wardd`.
    Validate { path: PathBuf },
    /// Validate a config file and report what it would change, without
    /// staging or applying it. Diffing against the running config is left
    /// to the operator; this only confirms the document parses and passes
    /// structural validation.
    DryRun { path: PathBuf },

    /// Replace the staged document wholesale from a local HCL file.
    SetConfig { path: PathBuf },
    /// Print the running (or staged) configuration as HCL.
    GetConfig {
        #[arg(long)]
        staged: bool,
    },
    /// Replace one named section (e.g. `dns`, `interface.eth0`) of the
    /// staged document from a local HCL file.
    SetConfigSection { section: String, path: PathBuf },
    /// Print one named section of the running (or staged) configuration.
    GetConfigSection {
        section: String,
        #[arg(long)]
        staged: bool,
    },
    /// Roll back to a prior generation and reapply it immediately.
    Rollback {
        #[arg(long)]
        generation: Option<u64>,
    },
    /// Confirm a pending safe-apply window before its auto-revert deadline.
    SafeApplyConfirm,
    /// Cancel a pending safe-apply window, reverting immediately.
    SafeApplyCancel,

    /// Interface management.
    Interface {
        #[command(subcommand)]
        command: InterfaceCommand,
    },
    /// Backup management.
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
    /// Dynamic IP-set authorization.
    Ipset {
        #[command(subcommand)]
        command: IpsetCommand,
    },
    /// Host system introspection.
    System {
        #[command(subcommand)]
        command: SystemCommand,
    },
    /// Emergency lockdown mode.
    SafeMode {
        #[command(subcommand)]
        command: SafeModeCommand,
    },

    /// Restart a managed service by name.
    RestartService { name: String },
    /// Reboot the host.
    Reboot,
    /// Report daemon status (generation, uptime, HA role, safe mode).
    Status,
    /// Liveness check.
    Ping,
}

#[derive(Subcommand)]
enum InterfaceCommand {
    /// Add a new interface from a local HCL file.
    Add { name: String, path: PathBuf },
    /// Replace an existing interface from a local HCL file.
    Update { name: String, path: PathBuf },
    /// Remove an interface.
    Remove { name: String },
    /// Attach a VLAN sub-interface from a local HCL file.
    AddVlan { interface: String, path: PathBuf },
    /// Detach a VLAN sub-interface by ID.
    RemoveVlan { interface: String, vlan_id: u16 },
    /// Set (or replace) an interface's bond from a local HCL file.
    SetBond { interface: String, path: PathBuf },
    /// Remove an interface's bond.
    RemoveBond { interface: String },
}

#[derive(Subcommand)]
enum BackupCommand {
    /// Snapshot the running configuration.
    Create {
        #[arg(long)]
        comment: Option<String>,
    },
    /// Stage a prior backup for inspection (does not apply it).
    Restore { id: String },
    /// Pin (or unpin) a backup so it's exempt from retention pruning.
    Pin { id: String, pinned: bool },
    /// List backups.
    List,
}

#[derive(Subcommand)]
enum IpsetCommand {
    /// Authorize an IP into a dynamic set, optionally with a TTL.
    Authorize {
        set: String,
        ip: IpAddr,
        #[arg(long)]
        ttl_secs: Option<u32>,
    },
    /// Revoke a previously authorized IP.
    Revoke { set: String, ip: IpAddr },
    /// List members of a set.
    List { set: String },
    /// Check whether an IP is currently a member of a set.
    Check { set: String, ip: IpAddr },
}

#[derive(Subcommand)]
enum SystemCommand {
    /// Load average and memory usage.
    Stats,
    /// Kernel routing table.
    Routes,
}

#[derive(Subcommand)]
enum SafeModeCommand {
    /// Enter safe mode: refuse every mutating request until `exit`.
    Enter,
    /// Leave safe mode.
    Exit,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::from(exit_code_for(&e))
        }
    }
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    if let Some(exit) = e.downcast_ref::<ExitError>() {
        return u8::try_from(exit.code).unwrap_or(1);
    }
    1
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let socket_path = cli.socket.unwrap_or_else(env::socket_path);
    let format = cli.output;

    match cli.command {
        Command::Start => start_service(),
        Command::Reload => reload_service(),
        Command::Apply => send_request(&socket_path, Request::Apply, format).await,
        Command::Discard => send_request(&socket_path, Request::Discard, format).await,
        Command::Validate { path } => validate(&path),
        Command::DryRun { path } => validate(&path),

        Command::SetConfig { path } => {
            let hcl = std::fs::read_to_string(&path)?;
            send_request(&socket_path, Request::SetConfig { hcl }, format).await
        }
        Command::GetConfig { staged } => {
            send_query(&socket_path, Query::GetConfig { staged }, format).await
        }
        Command::SetConfigSection { section, path } => {
            let hcl = std::fs::read_to_string(&path)?;
            send_request(&socket_path, Request::SetConfigSection { path: section, hcl }, format)
                .await
        }
        Command::GetConfigSection { section, staged } => {
            send_query(&socket_path, Query::GetConfigSection { path: section, staged }, format)
                .await
        }
        Command::Rollback { generation } => {
            send_request(&socket_path, Request::Rollback { generation }, format).await
        }
        Command::SafeApplyConfirm => {
            send_request(&socket_path, Request::SafeApplyConfirm, format).await
        }
        Command::SafeApplyCancel => {
            send_request(&socket_path, Request::SafeApplyCancel, format).await
        }

        Command::Interface { command } => interface_command(&socket_path, command, format).await,
        Command::Backup { command } => backup_command(&socket_path, command, format).await,
        Command::Ipset { command } => ipset_command(&socket_path, command, format).await,
        Command::System { command } => system_command(&socket_path, command, format).await,
        Command::SafeMode { command } => safe_mode_command(&socket_path, command, format).await,

        Command::RestartService { name } => {
            send_request(&socket_path, Request::RestartService { name }, format).await
        }
        Command::Reboot => send_request(&socket_path, Request::SystemReboot, format).await,
        Command::Status => send_query(&socket_path, Query::GetStatus, format).await,
        Command::Ping => send_query(&socket_path, Query::Ping, format).await,
    }
}

async fn interface_command(
    socket_path: &std::path::Path,
    command: InterfaceCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        InterfaceCommand::Add { name, path } => {
            let mut interface: Interface = hcl::from_str(&std::fs::read_to_string(&path)?)?;
            interface.name = name;
            send_request(socket_path, Request::AddInterface { interface }, format).await
        }
        InterfaceCommand::Update { name, path } => {
            let interface: Interface = hcl::from_str(&std::fs::read_to_string(&path)?)?;
            send_request(socket_path, Request::UpdateInterface { name, interface }, format).await
        }
        InterfaceCommand::Remove { name } => {
            send_request(socket_path, Request::RemoveInterface { name }, format).await
        }
        InterfaceCommand::AddVlan { interface, path } => {
            let vlan: Vlan = hcl::from_str(&std::fs::read_to_string(&path)?)?;
            send_request(socket_path, Request::AddVlan { interface, vlan }, format).await
        }
        InterfaceCommand::RemoveVlan { interface, vlan_id } => {
            send_request(socket_path, Request::RemoveVlan { interface, vlan_id }, format).await
        }
        InterfaceCommand::SetBond { interface, path } => {
            let bond: Bond = hcl::from_str(&std::fs::read_to_string(&path)?)?;
            send_request(socket_path, Request::SetBond { interface, bond }, format).await
        }
        InterfaceCommand::RemoveBond { interface } => {
            send_request(socket_path, Request::RemoveBond { interface }, format).await
        }
    }
}

async fn backup_command(
    socket_path: &std::path::Path,
    command: BackupCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        BackupCommand::Create { comment } => {
            send_request(socket_path, Request::BackupCreate { comment }, format).await
        }
        BackupCommand::Restore { id } => {
            send_request(socket_path, Request::BackupRestore { id }, format).await
        }
        BackupCommand::Pin { id, pinned } => {
            send_request(socket_path, Request::BackupPin { id, pinned }, format).await
        }
        BackupCommand::List => send_query(socket_path, Query::BackupList, format).await,
    }
}

async fn ipset_command(
    socket_path: &std::path::Path,
    command: IpsetCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        IpsetCommand::Authorize { set, ip, ttl_secs } => {
            send_request(socket_path, Request::AuthorizeIp { set, ip, ttl_secs }, format).await
        }
        IpsetCommand::Revoke { set, ip } => {
            send_request(socket_path, Request::RevokeIp { set, ip }, format).await
        }
        IpsetCommand::List { set } => send_query(socket_path, Query::ListIpSet { set }, format).await,
        IpsetCommand::Check { set, ip } => {
            send_query(socket_path, Query::CheckIpSet { set, ip }, format).await
        }
    }
}

async fn system_command(
    socket_path: &std::path::Path,
    command: SystemCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        SystemCommand::Stats => send_query(socket_path, Query::SystemStats, format).await,
        SystemCommand::Routes => send_query(socket_path, Query::SystemRoutes, format).await,
    }
}

async fn safe_mode_command(
    socket_path: &std::path::Path,
    command: SafeModeCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        SafeModeCommand::Enter => {
            send_request(socket_path, Request::SafeModeEnter, format).await
        }
        SafeModeCommand::Exit => send_request(socket_path, Request::SafeModeExit, format).await,
    }
}

async fn send_request(
    socket_path: &std::path::Path,
    request: Request,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connect(socket_path).await?;
    let response = client.request(request).await?;
    print_response(client::ok_or_daemon_error(response)?, format)
}

async fn send_query(
    socket_path: &std::path::Path,
    query: Query,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connect(socket_path).await?;
    let response = client.query(query).await?;
    print_response(client::ok_or_daemon_error(response)?, format)
}

async fn connect(socket_path: &std::path::Path) -> anyhow::Result<client::DaemonClient> {
    client::DaemonClient::connect(socket_path).await.map_err(|e| {
        if e.is_not_running() {
            anyhow::Error::new(ExitError::new(64, "wardd is not running"))
        } else {
            anyhow::Error::new(e)
        }
    })
}

fn print_response(response: Response, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => match response {
            Response::Ok => println!("ok"),
            Response::Pong => println!("pong"),
            Response::Status(s) => {
                println!("{} {}", color::header("generation:"), s.generation);
                println!("{} {}s", color::header("uptime:"), s.uptime_secs);
                println!("{} {}", color::header("ha role:"), s.ha_role);
                println!("{} {}", color::header("safe mode:"), s.safe_mode);
            }
            Response::ConfigDocument(doc) => print!("{doc}"),
            Response::BackupList(backups) => {
                for b in backups {
                    let comment = b.comment.as_deref().unwrap_or("");
                    println!(
                        "{}  {}  pinned={}  {}",
                        color::literal(&b.id),
                        b.created_at,
                        b.pinned,
                        color::muted(comment)
                    );
                }
            }
            Response::Backup(b) => println!("{} created at {}", b.id, b.created_at),
            Response::IpSetMembers(members) => {
                for m in members {
                    match m.expires_in_secs {
                        Some(secs) => println!("{}  expires in {}s", m.address, secs),
                        None => println!("{}  static", m.address),
                    }
                }
            }
            Response::IpSetCheck(present) => println!("{present}"),
            Response::SystemStats(stats) => {
                println!("uptime: {}s", stats.uptime_secs);
                println!(
                    "load average: {:.2} {:.2} {:.2}",
                    stats.load_avg_1m, stats.load_avg_5m, stats.load_avg_15m
                );
                println!("memory: {}/{} bytes used", stats.mem_used_bytes, stats.mem_total_bytes);
            }
            Response::SystemRoutes(routes) => {
                for r in routes {
                    match r.gateway {
                        Some(gw) => println!(
                            "{} via {} dev {} metric {}",
                            r.destination, gw, r.interface, r.metric
                        ),
                        None => {
                            println!("{} dev {} metric {}", r.destination, r.interface, r.metric)
                        }
                    }
                }
            }
            Response::Collaborator(value) => println!("{value}"),
            Response::Err(e) => unreachable!("ok_or_daemon_error already handled Err: {e}"),
        },
    }
    Ok(())
}

fn validate(path: &std::path::Path) -> anyhow::Result<()> {
    match ward_config::load(path) {
        Ok((_config, warnings)) => {
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
            println!("{} is valid", path.display());
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(ExitError::new(1, e.to_string()))),
    }
}

fn start_service() -> anyhow::Result<()> {
    run_systemctl(&["start", "wardd"])
}

fn reload_service() -> anyhow::Result<()> {
    let pid_path = PathBuf::from("/run/ward/wardd.pid");
    let contents = std::fs::read_to_string(&pid_path)
        .map_err(|e| anyhow::anyhow!("could not read {}: {e}", pid_path.display()))?;
    let pid: i32 = contents
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("malformed pid in {}: {e}", pid_path.display()))?;
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGHUP)
        .map_err(|e| anyhow::anyhow!("failed to signal wardd (pid {pid}): {e}"))?;
    println!("reload signal sent to wardd (pid {pid})");
    Ok(())
}

fn run_systemctl(args: &[&str]) -> anyhow::Result<()> {
    let status = std::process::Command::new("systemctl").args(args).status()?;
    if !status.success() {
        anyhow::bail!("systemctl {args:?} exited {status}");
    }
    Ok(())
}
