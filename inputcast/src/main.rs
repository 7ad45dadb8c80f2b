use anyhow::{bail, Context, Result};
use broadcast_server::{BroadcastHub, BroadcastServer};
use clap::Parser;
use input_devices::InputDevice;
use input_stream::{Session, StopReason};
use tracing::{info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    input_stream::init_logging_from_env(args.log_level.as_deref())
        .context("Failed to initialize logging")?;

    if args.list_devices {
        return list_devices();
    }

    let devices = open_devices(&args)?;
    if devices.is_empty() {
        warn!("No keyboard or mouse devices could be opened");
        eprintln!("No input devices found. Reading /dev/input usually requires");
        eprintln!("root or membership in the 'input' group.");
        bail!("No input devices available");
    }

    let hub = BroadcastHub::new(args.hub_config());
    let server = BroadcastServer::start(args.server_config(), hub.clone())
        .await
        .context("Failed to start websocket server")?;
    info!("Broadcasting input events on {}", server.url());

    let session = Session::new(args.session_config(), hub);
    let stop = session.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down server...");
                stop.shutdown();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });

    let outcome = session.run(devices).await;
    server.shutdown().await;

    let report = outcome.context("Input session failed")?;
    match report.reason {
        StopReason::Requested => Ok(()),
        StopReason::AllDevicesLost => bail!("All input devices were lost"),
    }
}

#[cfg(target_os = "linux")]
fn list_devices() -> Result<()> {
    let devices = input_devices::backends::linux::list();
    if devices.is_empty() {
        println!("No capturable input devices found (try running as root)");
    }
    for device in devices {
        println!("{device}");
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_devices(args: &Args) -> Result<Vec<Box<dyn InputDevice>>> {
    use input_devices::backends::linux::{self, EvdevDevice};

    if args.devices.is_empty() {
        return Ok(linux::discover()
            .into_iter()
            .map(|device| Box::new(device) as Box<dyn InputDevice>)
            .collect());
    }

    args.devices
        .iter()
        .map(|path| {
            let device = EvdevDevice::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            info!("Using {}", device.info());
            Ok(Box::new(device) as Box<dyn InputDevice>)
        })
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn list_devices() -> Result<()> {
    bail!("Listing input devices requires Linux evdev")
}

#[cfg(not(target_os = "linux"))]
fn open_devices(_args: &Args) -> Result<Vec<Box<dyn InputDevice>>> {
    bail!("Capturing input devices requires Linux evdev")
}
