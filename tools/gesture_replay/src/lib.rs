//! Replays a recorded touch/voice trace through a [`GestureController`] and
//! reports what the platform was asked to do.

use std::{fmt::Write as _, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use holdgate::{
    recording::RecordingPlatform, CloseReason, ControllerOutput, DispatchOutcome,
    GestureController, GestureKind, HoldgateConfig, ScreenContext, TouchFrame, TouchPhase,
    TouchPoint, VoiceOutcome, VoiceResult,
};

pub const EVENT_HEADER: &str = "event,ms,kind,detail";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseTarget {
    Menu,
    Voice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceRecord {
    Touch { ms: u64, frame: TouchFrame },
    Voice { ms: u64, result: VoiceResult },
    Close { ms: u64, target: CloseTarget },
    Screen { ms: u64, route: String },
    Tick { ms: u64 },
}

impl TraceRecord {
    pub fn ms(&self) -> u64 {
        match self {
            Self::Touch { ms, .. }
            | Self::Voice { ms, .. }
            | Self::Close { ms, .. }
            | Self::Screen { ms, .. }
            | Self::Tick { ms } => *ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayEvent {
    pub ms: u64,
    pub kind: &'static str,
    pub detail: String,
}

pub fn parse_trace_file(path: &Path) -> Result<Vec<TraceRecord>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_trace(&text).with_context(|| format!("in {}", path.display()))
}

pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>> {
    let mut out = Vec::new();
    let mut last_ms = 0u64;
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = parse_line(trimmed).with_context(|| format!("line {line_no}"))?;
        if record.ms() < last_ms {
            bail!("line {line_no}: timestamp {} goes backwards", record.ms());
        }
        last_ms = record.ms();
        out.push(record);
    }
    Ok(out)
}

fn parse_line(line: &str) -> Result<TraceRecord> {
    let (tag, rest) = line.split_once(',').unwrap_or((line, ""));
    let (ms_raw, args) = rest.split_once(',').unwrap_or((rest, ""));
    let ms = parse_num::<u64>(ms_raw, "ms")?;

    match tag.trim() {
        "touch" => {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() < 6 {
                bail!("touch needs phase,count,x0,y0,x1,y1");
            }
            let phase = match parts[0] {
                "start" => TouchPhase::Start,
                "move" => TouchPhase::Move,
                "end" => TouchPhase::End,
                "cancel" => TouchPhase::Cancel,
                other => bail!("unknown touch phase '{other}'"),
            };
            let count = parse_num::<u8>(parts[1], "count")?;
            let x0 = parse_num::<u16>(parts[2], "x0")?;
            let y0 = parse_num::<u16>(parts[3], "y0")?;
            let x1 = parse_num::<u16>(parts[4], "x1")?;
            let y1 = parse_num::<u16>(parts[5], "y1")?;
            Ok(TraceRecord::Touch {
                ms,
                frame: TouchFrame::many(
                    phase,
                    count,
                    [TouchPoint::new(x0, y0), TouchPoint::new(x1, y1)],
                ),
            })
        }
        "voice" => {
            let args = args.trim();
            let result = if args.starts_with('{') {
                serde_json::from_str::<VoiceResult>(args).context("invalid voice JSON")?
            } else {
                parse_voice_fields(args)?
            };
            Ok(TraceRecord::Voice { ms, result })
        }
        "close" => {
            let target = match args.trim() {
                "menu" => CloseTarget::Menu,
                "voice" => CloseTarget::Voice,
                other => bail!("unknown close target '{other}'"),
            };
            Ok(TraceRecord::Close { ms, target })
        }
        "screen" => Ok(TraceRecord::Screen {
            ms,
            route: args.trim().to_string(),
        }),
        "tick" => Ok(TraceRecord::Tick { ms }),
        other => Err(anyhow!("unknown record '{other}'")),
    }
}

/// `kind,destination,raw` with the raw text allowed to contain commas.
fn parse_voice_fields(args: &str) -> Result<VoiceResult> {
    let mut parts = args.splitn(3, ',').map(str::trim);
    let kind = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    let raw = parts.next().unwrap_or_default();
    Ok(match kind {
        "navigation" => VoiceResult::navigation(target, raw),
        "action" => VoiceResult::action(target, raw),
        "unknown" => VoiceResult::unknown(raw),
        "error" => VoiceResult::error(raw),
        other => bail!("unknown voice result kind '{other}'"),
    })
}

fn parse_num<T>(raw: &str, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid {field} '{}'", raw.trim()))
}

pub fn replay(config: &HoldgateConfig, records: &[TraceRecord]) -> Result<Vec<ReplayEvent>> {
    let mut controller = GestureController::new(config, RecordingPlatform::new())
        .context("controller rejected the config")?;
    let mut events = Vec::new();

    for record in records {
        let ms = record.ms();
        let output = match record {
            TraceRecord::Touch { frame, .. } => controller.on_touch(ms, frame),
            TraceRecord::Voice { result, .. } => controller.on_voice_result(ms, result),
            TraceRecord::Close {
                target: CloseTarget::Menu,
                ..
            } => controller.close_navigation_menu(ms),
            TraceRecord::Close {
                target: CloseTarget::Voice,
                ..
            } => controller.close_voice_overlay(ms, CloseReason::Dismissed),
            TraceRecord::Screen { route, .. } => {
                controller.set_screen_context(ScreenContext::new(route));
                continue;
            }
            TraceRecord::Tick { .. } => controller.tick(ms),
        };
        collect(ms, &output, &mut controller, &mut events);
    }

    // Let any timer still pending at the end of the capture fire.
    while let Some(due_ms) = controller.next_deadline_ms() {
        let output = controller.tick(due_ms);
        collect(due_ms, &output, &mut controller, &mut events);
    }

    Ok(events)
}

fn collect(
    ms: u64,
    output: &ControllerOutput,
    controller: &mut GestureController<RecordingPlatform>,
    events: &mut Vec<ReplayEvent>,
) {
    for activation in &output.activations {
        let kind = match activation.kind {
            GestureKind::Single => "single_press",
            GestureKind::Dual => "dual_press",
        };
        events.push(ReplayEvent {
            ms: activation.t_ms,
            kind,
            detail: format!("{}:{}", activation.origin.x, activation.origin.y),
        });
    }
    for outcome in &output.dispatched {
        if let DispatchOutcome::Ignored(reason) = outcome {
            events.push(ReplayEvent {
                ms,
                kind: "dispatch_ignored",
                detail: format!("{reason:?}"),
            });
        }
    }
    if output.grace_expired {
        events.push(ReplayEvent {
            ms,
            kind: "grace_expired",
            detail: String::new(),
        });
    }
    for call in controller.platform_mut().take_calls() {
        events.push(ReplayEvent {
            ms,
            kind: call.label(),
            detail: call.detail(),
        });
    }
    if output.voice == Some(VoiceOutcome::Dropped) {
        events.push(ReplayEvent {
            ms,
            kind: "voice_dropped",
            detail: String::new(),
        });
    }
}

pub fn render_csv(events: &[ReplayEvent]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{EVENT_HEADER}");
    for event in events {
        let _ = writeln!(out, "event,{},{},{}", event.ms, event.kind, event.detail);
    }
    out
}

pub fn parse_expected_kinds(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_ascii_lowercase)
        .collect()
}

pub fn check_expected(events: &[ReplayEvent], expected: &[String]) -> Result<()> {
    let actual: Vec<&str> = events.iter().map(|event| event.kind).collect();
    if actual != expected {
        bail!(
            "event sequence mismatch\nexpected kinds: {}\nactual kinds:   {}",
            expected.join(","),
            actual.join(",")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_record_kind() {
        let records = parse_trace(
            "# comment\n\
             screen,0,home\n\
             touch,0,start,1,10,20,0,0\n\
             tick,100\n\
             voice,200,navigation,agenda,open agenda, please\n\
             voice,300,{\"type\":\"action\",\"contactName\":\"Anna\",\"rawText\":\"call Anna\"}\n\
             close,400,voice\n",
        )
        .unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(
            records[3],
            TraceRecord::Voice {
                ms: 200,
                result: VoiceResult::navigation("agenda", "open agenda, please"),
            }
        );
        assert_eq!(
            records[4],
            TraceRecord::Voice {
                ms: 300,
                result: VoiceResult::action("Anna", "call Anna"),
            }
        );
    }

    #[test]
    fn rejects_backwards_time_and_bad_fields() {
        assert!(parse_trace("tick,100\ntick,50\n").is_err());
        assert!(parse_trace("touch,0,press,1,0,0,0,0\n").is_err());
        assert!(parse_trace("touch,0,start,1,0,0\n").is_err());
        assert!(parse_trace("close,0,sidebar\n").is_err());
    }

    #[test]
    fn expected_kinds_ignore_comments_and_case() {
        let kinds = parse_expected_kinds("# header\nHaptic\n\nmenu_open\n");
        assert_eq!(kinds, vec!["haptic".to_string(), "menu_open".to_string()]);
    }
}
