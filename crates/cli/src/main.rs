//! open-g-led CLI: command-line keyboard lighting tool.

mod profile;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use open_g_led_core::config::TransportConfig;
use open_g_led_core::hid::HidBackend;
use open_g_led_core::transport::Backend;
use open_g_led_core::{
    Color, DeviceFilter, Key, KeyColor, KeyGroup, KeyboardSession, NativeEffect, NativeEffectPart,
    NativeEffectStorage, OnBoardMode, StartupMode,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "open-g-led",
    version,
    about = "Open-source Logitech G keyboard lighting"
)]
struct Cli {
    /// Device access backend.
    #[arg(long, value_enum, default_value_t = BackendKind::Hid, global = true)]
    backend: BackendKind,
    /// JSON file with transport timing overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Vendor ID of the keyboard to open (hex).
    #[arg(long, value_parser = parse_hex_u16, global = true)]
    vendor_id: Option<u16>,
    /// Product ID of the keyboard to open (hex).
    #[arg(long, value_parser = parse_hex_u16, global = true)]
    product_id: Option<u16>,
    /// Serial number of the keyboard to open.
    #[arg(long, global = true)]
    serial: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    /// hidraw through hidapi.
    Hid,
    /// Raw USB control transfers through libusb.
    Usb,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List connected Logitech G keyboards.
    ListDevices {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Set every key to one color.
    SetAll {
        /// Color as RRGGBB.
        #[arg(value_parser = parse_color)]
        color: Color,
        #[arg(long)]
        no_commit: bool,
    },
    /// Set a key group to one color.
    SetGroup {
        /// logo, indicators, gkeys, fkeys, modifiers, multimedia, arrows, numeric, functions, keys.
        #[arg(value_parser = parse_group)]
        group: KeyGroup,
        #[arg(value_parser = parse_color)]
        color: Color,
        #[arg(long)]
        no_commit: bool,
    },
    /// Set a single key.
    SetKey {
        #[arg(value_parser = parse_key)]
        key: Key,
        #[arg(value_parser = parse_color)]
        color: Color,
        #[arg(long)]
        no_commit: bool,
    },
    /// Set one lighting region (G213, 1-5).
    SetRegion {
        region: u8,
        #[arg(value_parser = parse_color)]
        color: Color,
    },
    /// Apply pending key changes.
    Commit,
    /// Start a firmware effect.
    Fx {
        /// off, color, breathing, cycle, waves, hwave, vwave, cwave, ripple.
        #[arg(value_parser = parse_effect)]
        effect: NativeEffect,
        /// keys, logo, all.
        #[arg(value_parser = parse_part)]
        part: NativeEffectPart,
        #[arg(long, value_parser = parse_color, default_value = "ffffff")]
        color: Color,
        /// Speed in hex; the period is speed << 8 milliseconds.
        #[arg(long, value_parser = parse_hex_u8, conflicts_with = "period_ms")]
        speed: Option<u8>,
        /// Period in milliseconds.
        #[arg(long)]
        period_ms: Option<u64>,
        /// Also store the effect in the user profile.
        #[arg(long)]
        save: bool,
    },
    /// Select the power-up lighting (wave, color).
    StartupMode {
        #[arg(value_parser = parse_startup_mode)]
        mode: StartupMode,
    },
    /// Switch between on-board and software lighting (board, software).
    OnBoardMode {
        #[arg(value_parser = parse_onboard_mode)]
        mode: OnBoardMode,
    },
    /// Light (1) or clear (0) the MR key.
    Mr { value: u8 },
    /// Select the lit M-key.
    Mn { value: u8 },
    /// Enable (1) or disable (0) G-key macros.
    GkeysMode { value: u8 },
    /// Run a lighting profile, one command per line.
    Profile {
        /// Profile file; stdin when omitted or "-".
        path: Option<PathBuf>,
    },
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{s}': {e}"))
}

fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches("0x");
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

fn parse_color(s: &str) -> Result<Color, String> {
    let digits = s.trim_start_matches('#').trim_start_matches("0x");
    if digits.len() != 6 {
        return Err(format!("color '{s}' must be RRGGBB"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{s}': not hex"));
    }
    let value = u32::from_str_radix(digits, 16).map_err(|e| format!("invalid color '{s}': {e}"))?;
    let [_, r, g, b] = value.to_be_bytes();
    Ok(Color::new(r, g, b))
}

fn parse_key(s: &str) -> Result<Key, String> {
    Key::from_name(s).ok_or_else(|| format!("unknown key '{s}'"))
}

fn parse_group(s: &str) -> Result<KeyGroup, String> {
    KeyGroup::from_name(s).ok_or_else(|| format!("unknown key group '{s}'"))
}

fn parse_effect(s: &str) -> Result<NativeEffect, String> {
    NativeEffect::from_name(s).ok_or_else(|| format!("unknown effect '{s}'"))
}

fn parse_part(s: &str) -> Result<NativeEffectPart, String> {
    NativeEffectPart::from_name(s).ok_or_else(|| format!("unknown part '{s}'; use keys, logo or all"))
}

fn parse_startup_mode(s: &str) -> Result<StartupMode, String> {
    StartupMode::from_name(s).ok_or_else(|| format!("unknown startup mode '{s}'; use wave or color"))
}

fn parse_onboard_mode(s: &str) -> Result<OnBoardMode, String> {
    OnBoardMode::from_name(s).ok_or_else(|| format!("unknown on-board mode '{s}'; use board or software"))
}

fn make_backend(kind: BackendKind) -> Result<Box<dyn Backend>> {
    match kind {
        BackendKind::Hid => Ok(Box::new(HidBackend::new())),
        #[cfg(feature = "libusb")]
        BackendKind::Usb => Ok(Box::new(open_g_led_core::usb::UsbBackend::new()?)),
        #[cfg(not(feature = "libusb"))]
        BackendKind::Usb => bail!("this build has no libusb support; rebuild with --features libusb"),
    }
}

fn effect_period(speed: Option<u8>, period_ms: Option<u64>) -> Duration {
    match (speed, period_ms) {
        (Some(speed), _) => Duration::from_millis(u64::from(speed) << 8),
        (None, Some(ms)) => Duration::from_millis(ms),
        (None, None) => Duration::ZERO,
    }
}

fn finish(session: &mut KeyboardSession, no_commit: bool) -> Result<()> {
    if !no_commit {
        session.commit()?;
    }
    Ok(())
}

fn read_profile(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading profile from stdin")?;
            Ok(text)
        }
    }
}

fn run(session: &mut KeyboardSession, command: Commands) -> Result<()> {
    match command {
        Commands::ListDevices { .. } | Commands::Profile { .. } => {
            bail!("{command:?} cannot run on an open keyboard")
        }
        Commands::SetAll { color, no_commit } => {
            session.set_all_keys(color)?;
            finish(session, no_commit)?;
        }
        Commands::SetGroup {
            group,
            color,
            no_commit,
        } => {
            session.set_group_keys(group, color)?;
            finish(session, no_commit)?;
        }
        Commands::SetKey {
            key,
            color,
            no_commit,
        } => {
            session.set_key(KeyColor::new(key, color))?;
            finish(session, no_commit)?;
        }
        Commands::SetRegion { region, color } => session.set_region(region, color)?,
        Commands::Commit => session.commit()?,
        Commands::Fx {
            effect,
            part,
            color,
            speed,
            period_ms,
            save,
        } => {
            let storage = if save {
                NativeEffectStorage::User
            } else {
                NativeEffectStorage::None
            };
            session.set_native_effect(effect, part, effect_period(speed, period_ms), color, storage)?;
        }
        Commands::StartupMode { mode } => session.set_startup_mode(mode)?,
        Commands::OnBoardMode { mode } => session.set_on_board_mode(mode)?,
        Commands::Mr { value } => session.set_mr_key(value)?,
        Commands::Mn { value } => session.set_mn_key(value)?,
        Commands::GkeysMode { value } => session.set_gkeys_mode(value)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TransportConfig::load(path)?,
        None => TransportConfig::default(),
    };
    debug!(?config, "Transport configuration");
    let mut session = KeyboardSession::new(make_backend(cli.backend)?, config);

    if let Commands::ListDevices { json } = cli.command {
        let devices = session.list_devices()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&devices)?);
        } else if devices.is_empty() {
            println!("No Logitech G keyboards found.");
            println!("Ensure your keyboard is connected and udev rules are set up.");
        } else {
            for dev in &devices {
                println!(
                    "{} (VID: 0x{:04X}, PID: 0x{:04X}, serial: {}, path: {})",
                    dev.model.name(),
                    dev.vendor_id,
                    dev.product_id,
                    dev.serial_number.as_deref().unwrap_or("-"),
                    dev.path
                );
            }
        }
        return Ok(());
    }

    // Profiles are parsed up front so a bad line sends nothing.
    let commands = match cli.command {
        Commands::Profile { path } => profile::parse(&read_profile(path.as_deref())?)?,
        command => vec![command],
    };

    let filter = DeviceFilter {
        vendor_id: cli.vendor_id.unwrap_or(0),
        product_id: cli.product_id.unwrap_or(0),
        serial: cli.serial.clone().unwrap_or_default(),
    };
    session
        .open(&filter)
        .with_context(|| format!("opening keyboard via {}", session.backend_name()))?;

    for (index, command) in commands.into_iter().enumerate() {
        debug!(index, ?command, "Running command");
        run(&mut session, command)?;
    }

    session.close()?;
    Ok(())
}
