//! Lighting profiles: one command per line, read from a file or stdin.
//!
//! ```text
//! # comments start with '#'
//! var accent ff00ff
//! a 000000          # all keys, then commit (an: no commit)
//! gn fkeys $accent  # group (g / gn)
//! kn logo ff0000    # key (k / kn)
//! c                 # commit
//! r 1 00ff00        # region
//! fx breathing all ff0000 0a
//! startup-mode color
//! on-board-mode software
//! mr 1
//! mn 2
//! gkeys-mode 0
//! ```
//!
//! Colors in profiles are bare `RRGGBB`, since `#` opens a comment.

use crate::{
    parse_color, parse_effect, parse_group, parse_hex_u8, parse_key, parse_onboard_mode,
    parse_part, parse_startup_mode, Commands,
};
use anyhow::{anyhow, bail, Result};
use open_g_led_core::{Color, NativeEffect};
use std::collections::HashMap;

/// Parse a whole profile before anything is sent, so a typo on the last
/// line does not leave the keyboard half-configured.
pub fn parse(text: &str) -> Result<Vec<Commands>> {
    let mut vars: HashMap<&str, &str> = HashMap::new();
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens[0] == "var" {
            match tokens[1..] {
                [name, "=", value] | [name, value] => {
                    vars.insert(name, value);
                }
                _ => bail!("line {number}: expected 'var NAME VALUE'"),
            }
            continue;
        }
        let mut args = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token.strip_prefix('$') {
                Some(name) => match vars.get(name) {
                    Some(value) => args.push(*value),
                    None => bail!("line {number}: undefined variable '{name}'"),
                },
                None => args.push(token),
            }
        }
        let command = parse_line(&args).map_err(|e| anyhow!("line {number}: {e}"))?;
        commands.push(command);
    }
    Ok(commands)
}

fn parse_line(args: &[&str]) -> Result<Commands, String> {
    Ok(match *args {
        [cmd @ ("a" | "an"), color] => Commands::SetAll {
            color: parse_color(color)?,
            no_commit: cmd == "an",
        },
        [cmd @ ("g" | "gn"), group, color] => Commands::SetGroup {
            group: parse_group(group)?,
            color: parse_color(color)?,
            no_commit: cmd == "gn",
        },
        [cmd @ ("k" | "kn"), key, color] => Commands::SetKey {
            key: parse_key(key)?,
            color: parse_color(color)?,
            no_commit: cmd == "kn",
        },
        ["c"] => Commands::Commit,
        ["r", region, color] => Commands::SetRegion {
            region: region
                .parse()
                .map_err(|e| format!("invalid region '{region}': {e}"))?,
            color: parse_color(color)?,
        },
        ["fx", effect, part, ref rest @ ..] => parse_fx(effect, part, rest)?,
        ["startup-mode", mode] => Commands::StartupMode {
            mode: parse_startup_mode(mode)?,
        },
        ["on-board-mode", mode] => Commands::OnBoardMode {
            mode: parse_onboard_mode(mode)?,
        },
        ["mr", value] => Commands::Mr { value: parse_value(value)? },
        ["mn", value] => Commands::Mn { value: parse_value(value)? },
        ["gkeys-mode", value] => Commands::GkeysMode { value: parse_value(value)? },
        [cmd, ..] => return Err(format!("unknown command or wrong arguments: '{cmd}'")),
        [] => return Err("empty command".to_string()),
    })
}

/// `fx EFFECT PART [COLOR] [SPEED]`: the color is required by color,
/// breathing and ripple, and not accepted by the others.
fn parse_fx(effect: &str, part: &str, rest: &[&str]) -> Result<Commands, String> {
    let effect = parse_effect(effect)?;
    let part = parse_part(part)?;
    let takes_color = matches!(
        effect,
        NativeEffect::Color | NativeEffect::Breathing | NativeEffect::Ripple
    );
    let (color, rest) = match (takes_color, rest) {
        (true, [color, rest @ ..]) => (parse_color(color)?, rest),
        (true, []) => return Err(format!("effect '{effect:?}' needs a color")),
        (false, rest) => (Color::WHITE, rest),
    };
    let speed = match rest {
        [] => None,
        [speed] => Some(parse_hex_u8(speed)?),
        _ => return Err("too many fx arguments".to_string()),
    };
    Ok(Commands::Fx {
        effect,
        part,
        color,
        speed,
        period_ms: None,
        save: false,
    })
}

fn parse_value(s: &str) -> Result<u8, String> {
    s.parse().map_err(|e| format!("invalid value '{s}': {e}"))
}
